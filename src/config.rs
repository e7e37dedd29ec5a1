//! Board configuration loading.
//!
//! A configuration document names the aspect hierarchy in creation order,
//! the grid size, and the terminal placements. `null` in a terminal's
//! aspect slot marks a hole: the cell is occupied but connects to nothing.
//!
//! ```json
//! {
//!   "grid_size": 3,
//!   "aspects": [
//!     { "name": "fire" },
//!     { "name": "water" },
//!     { "name": "order", "parents": ["fire", "water"] }
//!   ],
//!   "terminals": [
//!     { "position": [-1, 0], "aspect": "fire" },
//!     { "position": [1, 0], "aspect": "water" },
//!     { "position": [0, 0], "aspect": null }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{AspectRegistry, Grid, Hex};
use crate::{Error, Result};

/// One aspect declaration. Parents are either both named or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<[String; 2]>,
}

/// One terminal placement; `aspect: null` is a blocked hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSpec {
    pub position: [i32; 2],
    pub aspect: Option<String>,
}

/// Parsed configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub grid_size: i32,
    pub aspects: Vec<AspectSpec>,
    pub terminals: Vec<TerminalSpec>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            aspects = config.aspects.len(),
            terminals = config.terminals.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Materialize the registry and grid this document describes.
    ///
    /// All validation failures (duplicate or unknown names, out-of-bounds
    /// or doubly occupied cells, bad grid size) surface as graph errors.
    pub fn build(&self) -> Result<(AspectRegistry, Grid)> {
        let mut registry = AspectRegistry::new();
        for spec in &self.aspects {
            match &spec.parents {
                None => {
                    registry.create_primal(&spec.name)?;
                }
                Some([parent1, parent2]) => {
                    let parent1 = registry
                        .id_of(parent1)
                        .ok_or_else(|| Error::UnknownAspect(parent1.clone()))?;
                    let parent2 = registry
                        .id_of(parent2)
                        .ok_or_else(|| Error::UnknownAspect(parent2.clone()))?;
                    registry.create_compound(&spec.name, parent1, parent2)?;
                }
            }
        }

        let mut grid = Grid::new(self.grid_size)?;
        for spec in &self.terminals {
            let position = Hex::new(spec.position[0], spec.position[1]);
            match &spec.aspect {
                Some(name) => {
                    let aspect = registry
                        .id_of(name)
                        .ok_or_else(|| Error::UnknownAspect(name.clone()))?;
                    grid.add(position, aspect)?;
                    grid.add_terminals([position])?;
                }
                None => grid.block(position)?,
            }
        }

        Ok((registry, grid))
    }
}

// ============================================================================
// Tests
// ============================================================================
