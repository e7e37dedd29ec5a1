//! Cell identity encoding for the bounded board.
//!
//! Every position within the maximum supported radius gets a unique small
//! index, which doubles as a bit position in a `u64` occupancy mask. The
//! table is a bijection over exactly those cells, built once and never
//! mutated afterwards.

use std::sync::LazyLock;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::hex::Hex;

/// Largest supported board side length.
pub const MAX_SIDE_LENGTH: i32 = 5;

/// Radius of the largest supported board.
pub const MAX_RADIUS: i32 = MAX_SIDE_LENGTH - 1;

/// Number of cells within `MAX_RADIUS`: `1 + 3 * r * (r + 1)`.
pub const CELL_COUNT: usize = 61;

/// Index of a cell in the encoding table. Doubles as a `u64` bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u8);

impl CellIndex {
    /// The cell's bit in an occupancy mask.
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct CellTable {
    by_hex: HashMap<Hex, CellIndex>,
    by_index: Vec<Hex>,
}

static CELLS: LazyLock<CellTable> = LazyLock::new(|| {
    let mut by_hex = HashMap::with_capacity(CELL_COUNT);
    let mut by_index = Vec::with_capacity(CELL_COUNT);

    // Row-major scan over the bounding rhombus, keeping in-radius cells.
    for i in -MAX_RADIUS..=MAX_RADIUS {
        for j in -MAX_RADIUS..=MAX_RADIUS {
            let hex = Hex::new(i, j);
            if Hex::distance(hex, Hex::ZERO) > MAX_RADIUS {
                continue;
            }
            by_hex.insert(hex, CellIndex(by_index.len() as u8));
            by_index.push(hex);
        }
    }

    debug_assert_eq!(by_index.len(), CELL_COUNT);
    CellTable { by_hex, by_index }
});

/// Look up the encoding of a position. `None` outside the maximum radius.
pub fn cell_index(position: Hex) -> Option<CellIndex> {
    CELLS.by_hex.get(&position).copied()
}

/// Inverse of [`cell_index`].
pub fn hex_at(index: CellIndex) -> Hex {
    CELLS.by_index[index.index()]
}

// ============================================================================
// Tests
// ============================================================================
