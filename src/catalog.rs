//! Built-in aspect hierarchy.
//!
//! A ready-made combination table modeled on the classic alchemical set:
//! six primal aspects and two tiers of compounds. Used by the CLI for
//! quick runs and by tests and benches that want a realistic hierarchy
//! without a configuration file.

use crate::model::AspectRegistry;
use crate::Result;

/// One seed entry; parents name earlier entries.
pub struct CatalogEntry {
    pub name: &'static str,
    pub parents: Option<[&'static str; 2]>,
}

/// The classic table, in creation order (parents before children).
pub fn classic_entries() -> Vec<CatalogEntry> {
    vec![
        // --- Primals ---
        CatalogEntry { name: "aer", parents: None },
        CatalogEntry { name: "aqua", parents: None },
        CatalogEntry { name: "ignis", parents: None },
        CatalogEntry { name: "terra", parents: None },
        CatalogEntry { name: "ordo", parents: None },
        CatalogEntry { name: "perditio", parents: None },
        // --- Second tier ---
        CatalogEntry { name: "lux", parents: Some(["aer", "ignis"]) },
        CatalogEntry { name: "motus", parents: Some(["aer", "ordo"]) },
        CatalogEntry { name: "potentia", parents: Some(["ordo", "ignis"]) },
        CatalogEntry { name: "vacuos", parents: Some(["aer", "perditio"]) },
        CatalogEntry { name: "gelum", parents: Some(["ignis", "perditio"]) },
        CatalogEntry { name: "victus", parents: Some(["aqua", "terra"]) },
        CatalogEntry { name: "vitreus", parents: Some(["terra", "ordo"]) },
        CatalogEntry { name: "venenum", parents: Some(["aqua", "perditio"]) },
        // --- Third tier ---
        CatalogEntry { name: "limus", parents: Some(["victus", "aqua"]) },
        CatalogEntry { name: "iter", parents: Some(["motus", "terra"]) },
        CatalogEntry { name: "sano", parents: Some(["victus", "ordo"]) },
        CatalogEntry { name: "vitium", parents: Some(["potentia", "perditio"]) },
    ]
}

/// Build a registry from the classic table.
pub fn classic() -> Result<AspectRegistry> {
    let mut registry = AspectRegistry::new();
    for entry in classic_entries() {
        match entry.parents {
            None => {
                registry.create_primal(entry.name)?;
            }
            Some([parent1, parent2]) => {
                // Creation order guarantees both parents resolve.
                let parent1 = registry
                    .id_of(parent1)
                    .ok_or_else(|| crate::Error::UnknownAspect(parent1.to_string()))?;
                let parent2 = registry
                    .id_of(parent2)
                    .ok_or_else(|| crate::Error::UnknownAspect(parent2.to_string()))?;
                registry.create_compound(entry.name, parent1, parent2)?;
            }
        }
    }
    Ok(registry)
}

// ============================================================================
// Tests
// ============================================================================
