//! Bounded placement grid.
//!
//! A cell either holds an aspect, is blocked (occupied with no aspect), or
//! is vacant — vacant cells are simply absent from the map. Terminals are
//! the distinguished placed cells a solve must keep fixed and connect;
//! they are tracked in insertion order so solver root selection is
//! deterministic.

use hashbrown::HashMap;

use super::aspect::AspectId;
use super::encoding::{self, MAX_SIDE_LENGTH};
use super::hex::Hex;
use crate::{Error, Result};

/// Placement grid of radius `side_length - 1`.
#[derive(Debug, Clone)]
pub struct Grid {
    side_length: i32,
    nodes: HashMap<Hex, Option<AspectId>>,
    terminals: Vec<Hex>,
}

impl Grid {
    /// Create an empty grid. `side_length` must be within `1..=5`.
    pub fn new(side_length: i32) -> Result<Self> {
        if !(1..=MAX_SIDE_LENGTH).contains(&side_length) {
            return Err(Error::SideLength(side_length));
        }
        Ok(Self {
            side_length,
            nodes: HashMap::new(),
            terminals: Vec::new(),
        })
    }

    pub fn side_length(&self) -> i32 {
        self.side_length
    }

    pub fn in_bounds(&self, position: Hex) -> bool {
        Hex::distance(position, Hex::ZERO) < self.side_length
    }

    /// Place an aspect. Fails on out-of-bounds, occupied, or terminal cells.
    pub fn add(&mut self, position: Hex, aspect: AspectId) -> Result<()> {
        self.insert(position, Some(aspect))
    }

    /// Occupy a cell with no aspect. Blocked cells count toward the
    /// placement mask but are never traversable.
    pub fn block(&mut self, position: Hex) -> Result<()> {
        self.insert(position, None)
    }

    fn insert(&mut self, position: Hex, cell: Option<AspectId>) -> Result<()> {
        if !self.in_bounds(position) {
            return Err(Error::OutOfBounds(position));
        }
        if self.nodes.contains_key(&position) {
            return Err(Error::Occupied(position));
        }
        if self.is_terminal(position) {
            return Err(Error::TerminalOccupied(position));
        }
        self.nodes.insert(position, cell);
        Ok(())
    }

    /// The aspect placed at a position. Fails if the cell is vacant or
    /// blocked.
    pub fn at(&self, position: Hex) -> Result<AspectId> {
        self.nodes
            .get(&position)
            .copied()
            .flatten()
            .ok_or(Error::Vacant(position))
    }

    /// Like [`Grid::at`] but without the error path.
    pub fn aspect_at(&self, position: Hex) -> Option<AspectId> {
        self.nodes.get(&position).copied().flatten()
    }

    /// True iff the position is within radius and occupied (aspect or block).
    pub fn contains(&self, position: Hex) -> bool {
        self.nodes.contains_key(&position)
    }

    /// Mark positions as terminals (set union). Each must already hold an
    /// aspect — terminals are a subset of the placed cells.
    pub fn add_terminals(&mut self, positions: impl IntoIterator<Item = Hex>) -> Result<()> {
        for position in positions {
            self.at(position)?;
            if !self.is_terminal(position) {
                self.terminals.push(position);
            }
        }
        Ok(())
    }

    /// Terminals in insertion order.
    pub fn terminals(&self) -> &[Hex] {
        &self.terminals
    }

    pub fn is_terminal(&self, position: Hex) -> bool {
        self.terminals.contains(&position)
    }

    /// OR of the cell bits of every occupied position. Seeds the search
    /// trail so a solve starts aware of all pre-existing placements.
    pub fn placement_mask(&self) -> u64 {
        self.nodes
            .keys()
            .filter_map(|&position| encoding::cell_index(position))
            .map(|cell| cell.bit())
            .fold(0, |mask, bit| mask | bit)
    }

    /// All occupied cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Hex, Option<AspectId>)> + '_ {
        self.nodes.iter().map(|(&position, &cell)| (position, cell))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::encoding::cell_index;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_side_length_bounds() {
        assert!(Grid::new(0).is_err());
        assert!(Grid::new(6).is_err());
        assert!(Grid::new(1).is_ok());
        assert!(Grid::new(5).is_ok());
    }

    #[test]
    fn test_add_twice_fails() {
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(1, 0), AspectId(0)).unwrap();
        assert!(matches!(
            grid.add(Hex::new(1, 0), AspectId(1)),
            Err(Error::Occupied(_)),
        ));
    }

    #[test]
    fn test_add_out_of_bounds_fails() {
        let mut grid = Grid::new(2).unwrap();
        assert!(matches!(
            grid.add(Hex::new(2, 0), AspectId(0)),
            Err(Error::OutOfBounds(_)),
        ));
    }

    #[test]
    fn test_at_vacant_fails() {
        let grid = Grid::new(3).unwrap();
        assert!(matches!(grid.at(Hex::ZERO), Err(Error::Vacant(_))));
    }

    #[test]
    fn test_blocked_cell_occupies_but_has_no_aspect() {
        let mut grid = Grid::new(3).unwrap();
        grid.block(Hex::ZERO).unwrap();
        assert!(grid.contains(Hex::ZERO));
        assert_eq!(grid.aspect_at(Hex::ZERO), None);
        assert!(grid.at(Hex::ZERO).is_err());
    }

    #[test]
    fn test_terminals_must_hold_an_aspect() {
        let mut grid = Grid::new(3).unwrap();
        grid.block(Hex::new(0, 1)).unwrap();
        assert!(grid.add_terminals([Hex::new(0, 1)]).is_err());
        assert!(grid.add_terminals([Hex::new(1, 1)]).is_err());
    }

    #[test]
    fn test_terminal_union_keeps_insertion_order() {
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(1, 0), AspectId(0)).unwrap();
        grid.add(Hex::new(0, 1), AspectId(1)).unwrap();
        grid.add_terminals([Hex::new(1, 0), Hex::new(0, 1)]).unwrap();
        grid.add_terminals([Hex::new(1, 0)]).unwrap();
        assert_eq!(grid.terminals(), &[Hex::new(1, 0), Hex::new(0, 1)]);
    }

    #[test]
    fn test_placing_onto_terminal_fails() {
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(1, 0), AspectId(0)).unwrap();
        grid.add_terminals([Hex::new(1, 0)]).unwrap();
        assert!(matches!(
            grid.add(Hex::new(1, 0), AspectId(1)),
            Err(Error::Occupied(_)),
        ));
    }

    #[test]
    fn test_placement_mask_is_or_of_cell_bits() {
        let mut grid = Grid::new(3).unwrap();
        let c1 = Hex::new(1, 0);
        let c2 = Hex::new(-2, 1);
        grid.add(c1, AspectId(0)).unwrap();
        grid.add(c2, AspectId(1)).unwrap();
        let expected = cell_index(c1).unwrap().bit() | cell_index(c2).unwrap().bit();
        assert_eq!(grid.placement_mask(), expected);
    }

    #[test]
    fn test_placement_mask_empty_grid_is_zero() {
        assert_eq!(Grid::new(4).unwrap().placement_mask(), 0);
    }
}
