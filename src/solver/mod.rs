//! # Solvers
//!
//! Two search engines over the same transition model:
//!
//! | Solver | Module | Terminals | Result |
//! |--------|--------|-----------|--------|
//! | Best-first chain search | `chain` | exactly 2 | ordered placements |
//! | Dreyfus–Wagner | `steiner` | 3..=15 | minimum tree cost |
//!
//! Both branch over aspect links when stepping onto vacant cells and close
//! onto already-placed terminals at zero cost. Neither suspends; both poll
//! a [`CancelToken`] in their frontier-pop loops.

pub mod chain;
pub mod steiner;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{AspectId, CellIndex, Hex};

pub use chain::Chain;

// ============================================================================
// Composite search key
// ============================================================================

/// Identity of a placed node in the weighted search graph.
///
/// The same cell with two different aspect choices is a distinct vertex,
/// because future compatibility differs. Derived equality/hash over the two
/// bounded halves is the key; [`NodeKey::packed`] exposes the same identity
/// as one fixed-width integer (high half cell, low half aspect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub cell: CellIndex,
    pub aspect: AspectId,
}

impl NodeKey {
    pub fn new(cell: CellIndex, aspect: AspectId) -> Self {
        Self { cell, aspect }
    }

    pub fn packed(self) -> u32 {
        (self.cell.index() as u32) << 16 | self.aspect.0 as u32
    }
}

// ============================================================================
// Placements
// ============================================================================

/// One placed (or pre-existing terminal) cell in a solution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Hex,
    pub aspect: AspectId,
}

// ============================================================================
// Cooperative cancellation
// ============================================================================

/// Cooperative cancellation flag, polled once per frontier pop.
///
/// Both solvers are unbounded-iteration loops — exponential in the worst
/// case for the Steiner solver — so long runs need an external way out.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell_index;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_packed_key_splits_into_halves() {
        let cell = cell_index(Hex::new(1, -2)).unwrap();
        let key = NodeKey::new(cell, AspectId(7));
        assert_eq!(key.packed() >> 16, cell.index() as u32);
        assert_eq!(key.packed() & 0xFFFF, 7);
    }

    #[test]
    fn test_same_cell_different_aspect_is_distinct() {
        let cell = cell_index(Hex::ZERO).unwrap();
        assert_ne!(
            NodeKey::new(cell, AspectId(0)),
            NodeKey::new(cell, AspectId(1)),
        );
    }

    #[test]
    fn test_cancel_token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        let clone = token.clone();
        assert!(clone.is_cancelled());
    }
}
