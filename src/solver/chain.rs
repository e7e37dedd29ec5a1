//! Two-terminal chain search.
//!
//! Best-first search over `(position, aspect, cost, tier, trail)` states.
//! Stepping onto a vacant cell places one of the current aspect's links for
//! cost 1; stepping onto a cell whose bit is already in the trail is only
//! legal when that cell is a compatible terminal, and costs nothing — the
//! chain is closing onto a placement that already exists. The frontier is
//! ordered by `cost + heuristic`, ties broken by ascending tier so equal
//! length chains prefer cheaper aspects.

use std::collections::BinaryHeap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{CancelToken, NodeKey, Placement};
use crate::model::{cell_index, hex_at, AspectRegistry, CellIndex, Grid, Hex, CELL_COUNT};
use crate::{Error, Result};

// ============================================================================
// Chain
// ============================================================================

/// An ordered run of placements connecting two terminals, start first.
///
/// Both terminal cells are included; everything between them is new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub placements: Vec<Placement>,
    /// Number of newly placed cells (terminal closures are free).
    pub cost: u32,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn start(&self) -> Option<&Placement> {
        self.placements.first()
    }

    pub fn end(&self) -> Option<&Placement> {
        self.placements.last()
    }
}

// ============================================================================
// Search state
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct SearchState {
    position: Hex,
    aspect_tier: u32,
    g: u32,
    h: u32,
    trail: u64,
    key: NodeKey,
}

impl SearchState {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

impl Ord for SearchState {
    // Reversed so the std max-heap pops the smallest (f, tier) first.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .f()
            .cmp(&self.f())
            .then_with(|| other.aspect_tier.cmp(&self.aspect_tier))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for SearchState {}

/// Whether a candidate displaces the incumbent best for the same vertex.
/// On a raw-cost tie each side weighs in its own aspect tier.
fn beats_incumbent(candidate: u32, candidate_tier: u32, best: u32, best_tier: u32) -> bool {
    if candidate != best {
        return candidate < best;
    }
    candidate + candidate_tier < best + best_tier
}

// ============================================================================
// Solve
// ============================================================================

/// Find the minimum-cost chain connecting terminals `start` and `end`.
///
/// `start == end` is the trivial case and returns an empty chain of cost 0.
/// Returns [`Error::NoPath`] when the frontier drains without reaching
/// `end`.
pub fn solve(grid: &Grid, registry: &AspectRegistry, start: Hex, end: Hex) -> Result<Chain> {
    solve_cancellable(grid, registry, start, end, &CancelToken::new())
}

/// [`solve`], polling `cancel` once per frontier pop.
pub fn solve_cancellable(
    grid: &Grid,
    registry: &AspectRegistry,
    start: Hex,
    end: Hex,
    cancel: &CancelToken,
) -> Result<Chain> {
    for terminal in [start, end] {
        if !grid.is_terminal(terminal) {
            return Err(Error::NotATerminal(terminal));
        }
    }

    if start == end {
        return Ok(Chain {
            placements: Vec::new(),
            cost: 0,
        });
    }

    let start_aspect = grid.at(start)?;
    let start_key = NodeKey::new(cell_of(start)?, start_aspect);
    cell_of(end)?;

    let mut best_costs: HashMap<NodeKey, u32> = HashMap::new();
    let mut parents: HashMap<NodeKey, NodeKey> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    let mut expansions = 0u64;

    best_costs.insert(start_key, 0);
    frontier.push(SearchState {
        position: start,
        aspect_tier: registry.get(start_aspect)?.tier(),
        g: 0,
        h: Hex::distance(start, end) as u32,
        trail: grid.placement_mask(),
        key: start_key,
    });

    while let Some(state) = frontier.pop() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        // A vertex relaxed again after this state was pushed is stale.
        if best_costs.get(&state.key).is_some_and(|&best| state.g > best) {
            continue;
        }

        if state.position == end {
            let chain = reconstruct(&parents, start_key, state.key, state.g)?;
            info!(
                cost = chain.cost,
                steps = chain.len(),
                expansions,
                "chain found"
            );
            return Ok(chain);
        }

        expansions += 1;
        let links = registry.get(state.key.aspect)?.links();

        for neighbor in state.position.neighbors() {
            if !grid.in_bounds(neighbor) {
                continue;
            }
            let cell = cell_of(neighbor)?;

            if state.trail & cell.bit() != 0 {
                // Occupied or already on this trail: only a compatible
                // terminal may be connected to, and connecting is free.
                if !grid.is_terminal(neighbor) {
                    continue;
                }
                let existing = grid.at(neighbor)?;
                if !links.contains(&existing) {
                    continue;
                }
                relax(
                    registry,
                    &mut best_costs,
                    &mut parents,
                    &mut frontier,
                    &state,
                    neighbor,
                    NodeKey::new(cell, existing),
                    state.g,
                    state.trail,
                    end,
                )?;
            } else {
                for &aspect in links {
                    relax(
                        registry,
                        &mut best_costs,
                        &mut parents,
                        &mut frontier,
                        &state,
                        neighbor,
                        NodeKey::new(cell, aspect),
                        state.g + 1,
                        state.trail | cell.bit(),
                        end,
                    )?;
                }
            }
        }
    }

    debug!(expansions, "frontier drained without reaching the far terminal");
    Err(Error::NoPath)
}

#[allow(clippy::too_many_arguments)]
fn relax(
    registry: &AspectRegistry,
    best_costs: &mut HashMap<NodeKey, u32>,
    parents: &mut HashMap<NodeKey, NodeKey>,
    frontier: &mut BinaryHeap<SearchState>,
    from: &SearchState,
    position: Hex,
    key: NodeKey,
    cost: u32,
    trail: u64,
    end: Hex,
) -> Result<()> {
    let tier = registry.get(key.aspect)?.tier();
    let best = best_costs.get(&key).copied().unwrap_or(u32::MAX);
    // Incumbent and candidate share the vertex, hence the aspect and tier.
    if !beats_incumbent(cost, tier, best, tier) {
        return Ok(());
    }

    best_costs.insert(key, cost);
    parents.insert(key, from.key);
    frontier.push(SearchState {
        position,
        aspect_tier: tier,
        g: cost,
        h: Hex::distance(position, end) as u32,
        trail,
        key,
    });
    Ok(())
}

fn reconstruct(
    parents: &HashMap<NodeKey, NodeKey>,
    start_key: NodeKey,
    end_key: NodeKey,
    cost: u32,
) -> Result<Chain> {
    let mut keys = vec![end_key];
    let mut current = end_key;
    // The parent chain is acyclic by construction; the bound guards the
    // bookkeeping, not the algorithm.
    let limit = CELL_COUNT * (u16::MAX as usize + 1);

    while current != start_key {
        match parents.get(&current) {
            Some(&parent) => current = parent,
            None => return invariant_violation("chain parent missing during reconstruction"),
        }
        keys.push(current);
        if keys.len() > limit {
            return invariant_violation("chain parent walk did not terminate");
        }
    }

    keys.reverse();
    let placements = keys
        .into_iter()
        .map(|key| Placement {
            position: hex_at(key.cell),
            aspect: key.aspect,
        })
        .collect();

    Ok(Chain { placements, cost })
}

fn cell_of(position: Hex) -> Result<CellIndex> {
    cell_index(position).ok_or(Error::OutOfBounds(position))
}

fn invariant_violation(message: &'static str) -> Result<Chain> {
    error!(message, "solver invariant violated");
    debug_assert!(false, "{message}");
    Err(Error::Internal(message))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AspectId;
    use pretty_assertions::assert_eq;

    fn linked_pair() -> (AspectRegistry, AspectId, AspectId, AspectId) {
        let mut reg = AspectRegistry::new();
        let fire = reg.create_primal("fire").unwrap();
        let water = reg.create_primal("water").unwrap();
        let order = reg.create_compound("order", fire, water).unwrap();
        (reg, fire, water, order)
    }

    #[test]
    fn test_tie_break_is_symmetric_in_both_orderings() {
        // Tied raw costs: each side adds its own tier, lower tier wins.
        assert!(beats_incumbent(4, 1, 4, 2));
        assert!(!beats_incumbent(4, 2, 4, 1));
        // Equal tiers cannot displace each other in either order.
        assert!(!beats_incumbent(4, 2, 4, 2));
        // Off-tie, raw cost dominates regardless of tier.
        assert!(beats_incumbent(3, 9, 4, 1));
        assert!(!beats_incumbent(5, 1, 4, 9));
    }

    #[test]
    fn test_start_equals_end_is_trivial_success() {
        let (reg, fire, _, _) = linked_pair();
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::ZERO, fire).unwrap();
        grid.add_terminals([Hex::ZERO]).unwrap();

        let chain = solve(&grid, &reg, Hex::ZERO, Hex::ZERO).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.cost, 0);
    }

    #[test]
    fn test_adjacent_compatible_terminals_connect_for_free() {
        let (reg, fire, _, order) = linked_pair();
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::ZERO, fire).unwrap();
        grid.add(Hex::new(1, 0), order).unwrap();
        grid.add_terminals([Hex::ZERO, Hex::new(1, 0)]).unwrap();

        let chain = solve(&grid, &reg, Hex::ZERO, Hex::new(1, 0)).unwrap();
        assert_eq!(chain.cost, 0);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.start().unwrap().position, Hex::ZERO);
        assert_eq!(chain.end().unwrap().position, Hex::new(1, 0));
    }

    #[test]
    fn test_one_gap_bridged_by_shared_compound() {
        let (reg, fire, water, order) = linked_pair();
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(-1, 0), fire).unwrap();
        grid.add(Hex::new(1, 0), water).unwrap();
        grid.add_terminals([Hex::new(-1, 0), Hex::new(1, 0)]).unwrap();

        let chain = solve(&grid, &reg, Hex::new(-1, 0), Hex::new(1, 0)).unwrap();
        assert_eq!(chain.cost, 1);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.placements[1].position, Hex::ZERO);
        assert_eq!(chain.placements[1].aspect, order);
    }

    #[test]
    fn test_unlinked_primals_have_no_path() {
        let mut reg = AspectRegistry::new();
        let fire = reg.create_primal("fire").unwrap();
        let water = reg.create_primal("water").unwrap();

        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(-1, 0), fire).unwrap();
        grid.add(Hex::new(2, 0), water).unwrap();
        grid.add_terminals([Hex::new(-1, 0), Hex::new(2, 0)]).unwrap();

        assert!(matches!(
            solve(&grid, &reg, Hex::new(-1, 0), Hex::new(2, 0)),
            Err(Error::NoPath),
        ));
    }

    #[test]
    fn test_non_terminal_start_is_rejected() {
        let (reg, fire, _, _) = linked_pair();
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::ZERO, fire).unwrap();

        assert!(matches!(
            solve(&grid, &reg, Hex::ZERO, Hex::ZERO),
            Err(Error::NotATerminal(_)),
        ));
    }

    #[test]
    fn test_cancelled_token_stops_the_search() {
        let (reg, fire, water, _) = linked_pair();
        let mut grid = Grid::new(3).unwrap();
        grid.add(Hex::new(-1, 0), fire).unwrap();
        grid.add(Hex::new(1, 0), water).unwrap();
        grid.add_terminals([Hex::new(-1, 0), Hex::new(1, 0)]).unwrap();

        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            solve_cancellable(&grid, &reg, Hex::new(-1, 0), Hex::new(1, 0), &token),
            Err(Error::Cancelled),
        ));
    }

    #[test]
    fn test_chain_never_revisits_a_cell() {
        let (reg, fire, water, _) = linked_pair();
        let mut grid = Grid::new(4).unwrap();
        grid.add(Hex::new(-2, 0), fire).unwrap();
        grid.add(Hex::new(2, 0), water).unwrap();
        grid.add_terminals([Hex::new(-2, 0), Hex::new(2, 0)]).unwrap();

        let chain = solve(&grid, &reg, Hex::new(-2, 0), Hex::new(2, 0)).unwrap();
        let mut seen = hashbrown::HashSet::new();
        for placement in &chain.placements {
            assert!(seen.insert(placement.position), "revisited {}", placement.position);
        }
    }
}
