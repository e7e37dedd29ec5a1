//! Aspect hierarchy: typed nodes with tiers and a symmetric link relation.
//!
//! Aspects are created in hierarchy order (parents before children) and
//! identified by dense ids into an append-only table. A compound aspect
//! links to both parents; each parent links back to it. Nothing is ever
//! removed.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dense aspect identifier, assigned contiguously at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AspectId(pub u16);

impl AspectId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AspectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single aspect. Immutable after creation, except that newly created
/// children are appended into `links`.
#[derive(Debug, Clone)]
pub struct Aspect {
    name: String,
    tier: u32,
    parents: Option<(AspectId, AspectId)>,
    links: HashSet<AspectId>,
}

impl Aspect {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1 for primal aspects, otherwise `1 + max(parent tiers)`.
    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn parents(&self) -> Option<(AspectId, AspectId)> {
        self.parents
    }

    pub fn is_primal(&self) -> bool {
        self.parents.is_none()
    }

    /// Aspects directly compatible with this one: its parents plus every
    /// aspect that names it as a parent.
    pub fn links(&self) -> &HashSet<AspectId> {
        &self.links
    }
}

/// Append-only aspect table with by-name lookup.
#[derive(Debug, Default, Clone)]
pub struct AspectRegistry {
    aspects: Vec<Aspect>,
    by_name: HashMap<String, AspectId>,
}

impl AspectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    /// Create a primal (tier 1, parentless) aspect.
    pub fn create_primal(&mut self, name: &str) -> Result<AspectId> {
        self.insert(name, None)
    }

    /// Create a compound aspect from two existing parents. Registers the
    /// new aspect into both parents' link sets.
    pub fn create_compound(
        &mut self,
        name: &str,
        parent1: AspectId,
        parent2: AspectId,
    ) -> Result<AspectId> {
        if parent1 == parent2 {
            return Err(Error::IdenticalParents);
        }
        // Validate both parents before mutating anything.
        self.get(parent1)?;
        self.get(parent2)?;
        self.insert(name, Some((parent1, parent2)))
    }

    fn insert(&mut self, name: &str, parents: Option<(AspectId, AspectId)>) -> Result<AspectId> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateAspect(name.to_string()));
        }

        let id = AspectId(self.aspects.len() as u16);
        let (tier, links) = match parents {
            None => (1, HashSet::new()),
            Some((p1, p2)) => {
                let tier = 1 + self.get(p1)?.tier.max(self.get(p2)?.tier);
                let links = HashSet::from_iter([p1, p2]);
                (tier, links)
            }
        };

        self.aspects.push(Aspect {
            name: name.to_string(),
            tier,
            parents,
            links,
        });
        self.by_name.insert(name.to_string(), id);

        if let Some((p1, p2)) = parents {
            self.aspects[p1.index()].links.insert(id);
            self.aspects[p2.index()].links.insert(id);
        }

        Ok(id)
    }

    /// Fails with an out-of-range error for ids that were never created.
    pub fn get(&self, id: AspectId) -> Result<&Aspect> {
        self.aspects.get(id.index()).ok_or(Error::AspectRange(id))
    }

    pub fn id_of(&self, name: &str) -> Option<AspectId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AspectId, &Aspect)> {
        self.aspects
            .iter()
            .enumerate()
            .map(|(raw, aspect)| (AspectId(raw as u16), aspect))
    }
}

// ============================================================================
// Tests
// ============================================================================
