//! # Board Model
//!
//! The value types every other layer speaks in: hex coordinates, the
//! aspect hierarchy, the cell encoding table, and the placement grid.
//!
//! Design rule: this module is pure data plus invariant checks — no
//! search logic, no I/O, no rendering.

pub mod aspect;
pub mod encoding;
pub mod grid;
pub mod hex;

pub use aspect::{Aspect, AspectId, AspectRegistry};
pub use encoding::{cell_index, hex_at, CellIndex, CELL_COUNT, MAX_RADIUS, MAX_SIDE_LENGTH};
pub use grid::Grid;
pub use hex::Hex;
