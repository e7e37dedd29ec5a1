//! Dreyfus–Wagner Steiner-tree solver.
//!
//! Computes the minimum total placement cost of a tree connecting 3..=15
//! terminals. Subset dynamic programming over the non-root terminals,
//! merged with shortest-path relaxation:
//!
//! 1. Seed: a Dijkstra-style relaxation from every terminal, using the
//!    chain search's transition rule, fills the singleton rows and
//!    discovers the vertex domain.
//! 2. Merge: every subset `D` of the non-root terminals (ascending bit
//!    count, so strict sub-splits are final) is split at each vertex
//!    into a sub-tree plus a single detached terminal, then relaxed
//!    outward along the phase-1 distances.
//! 3. Root: the answer is the cheapest vertex at which the root's own
//!    distances meet a full-subset split.
//!
//! Subset enumeration is exponential in terminal count; the 15-terminal
//! cap exists so this stays tractable, and callers reject larger boards
//! before ever reaching this module.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::{debug, error, info};

use super::{CancelToken, NodeKey};
use crate::model::{cell_index, AspectRegistry, CellIndex, Grid, Hex, CELL_COUNT};
use crate::{Error, Result};

pub const MIN_TERMINALS: usize = 3;
pub const MAX_TERMINALS: usize = 15;

/// Sentinel for combinations no relaxation has reached.
const UNREACHABLE: u32 = u32::MAX;

// ============================================================================
// Distance table
// ============================================================================

/// The dynamic-programming table, split by row kind so subset relaxation
/// can read vertex rows while writing subset rows.
#[derive(Debug, Default)]
struct DistanceTable {
    /// `dp[S][v]`: cheapest tree spanning terminal subset `S` (a mask of
    /// terminal cell bits) that touches vertex `v`. Single-bit rows are
    /// the phase-1 single-source distances.
    subset_rows: HashMap<u64, HashMap<NodeKey, u32>>,
    /// `dp[v][u]`: cheapest known cost between two discovered vertices,
    /// harvested from the phase-1 relaxation trees.
    node_rows: HashMap<NodeKey, HashMap<NodeKey, u32>>,
}

impl DistanceTable {
    fn subset_get(&self, subset: u64, v: NodeKey) -> u32 {
        self.subset_rows
            .get(&subset)
            .and_then(|row| row.get(&v))
            .copied()
            .unwrap_or(UNREACHABLE)
    }

    fn node_set_min(&mut self, v: NodeKey, u: NodeKey, cost: u32) {
        let slot = self.node_rows.entry(v).or_default().entry(u).or_insert(UNREACHABLE);
        *slot = (*slot).min(cost);
    }
}

/// `min over e in members of dp[subset \ e][v] + dp[{e}][v]`: the cheapest
/// way to stand a tree for `subset` at `v` by grafting one detached
/// terminal onto a tree for the rest.
fn split_cost(table: &DistanceTable, members: &[u64], subset: u64, v: NodeKey) -> u32 {
    let mut min = UNREACHABLE;
    for &e in members {
        let rest = table.subset_get(subset ^ e, v);
        let single = table.subset_get(e, v);
        if rest == UNREACHABLE || single == UNREACHABLE {
            continue;
        }
        min = min.min(rest.saturating_add(single));
    }
    min
}

// ============================================================================
// Frontier state
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct FrontierState {
    cost: u32,
    tier: u32,
    position: Hex,
    key: NodeKey,
    trail: u64,
}

impl Ord for FrontierState {
    // Reversed so the std max-heap pops the cheapest (then lowest-tier) first.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.tier.cmp(&self.tier))
    }
}

impl PartialOrd for FrontierState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FrontierState {}

// ============================================================================
// Solve
// ============================================================================

/// Minimum total placement cost of a tree connecting every terminal.
///
/// The first terminal (insertion order) is designated root; the result is
/// invariant to that choice. Returns [`Error::NoTree`] when the final
/// minimum stays unreachable.
pub fn solve(grid: &Grid, registry: &AspectRegistry) -> Result<u32> {
    let root = *grid
        .terminals()
        .first()
        .ok_or(Error::TerminalCount(0))?;
    solve_with_root(grid, registry, root, &CancelToken::new())
}

/// [`solve`] with an explicit root terminal and cancellation.
pub fn solve_with_root(
    grid: &Grid,
    registry: &AspectRegistry,
    root: Hex,
    cancel: &CancelToken,
) -> Result<u32> {
    let terminals = grid.terminals();
    if !(MIN_TERMINALS..=MAX_TERMINALS).contains(&terminals.len()) {
        return Err(Error::TerminalCount(terminals.len()));
    }
    if !grid.is_terminal(root) {
        return Err(Error::NotATerminal(root));
    }

    let mut table = DistanceTable::default();
    let mut discovered: HashSet<NodeKey> = HashSet::new();

    // --- Phase 1: single-source distances from every terminal ---
    //
    // TODO: seed each terminal on its own thread; the node-row merges are
    // associative but would need synchronized writes.
    for &terminal in terminals {
        seed_from_terminal(grid, registry, &mut table, &mut discovered, terminal, cancel)?;
    }

    let mut vertices: Vec<NodeKey> = discovered.into_iter().collect();
    vertices.sort_unstable();
    debug!(vertices = vertices.len(), "terminal seeding complete");

    // --- Phase 2: subset merge, ascending popcount ---
    let root_bit = cell_of(root)?.bit();
    let mut others: SmallVec<[u64; MAX_TERMINALS]> = SmallVec::new();
    for &terminal in terminals {
        if terminal != root {
            others.push(cell_of(terminal)?.bit());
        }
    }

    let mut subsets: BinaryHeap<Reverse<(u32, u64)>> = BinaryHeap::new();
    for selector in 1u32..(1 << others.len()) {
        if selector.count_ones() < 2 {
            continue;
        }
        let mask = others
            .iter()
            .enumerate()
            .filter(|(index, _)| selector >> index & 1 == 1)
            .fold(0u64, |mask, (_, &bit)| mask | bit);
        subsets.push(Reverse((mask.count_ones(), mask)));
    }
    let subset_count = subsets.len();

    while let Some(Reverse((_, subset))) = subsets.pop() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let members: SmallVec<[u64; MAX_TERMINALS]> =
            others.iter().copied().filter(|bit| subset & bit != 0).collect();

        for &v in &vertices {
            let split = split_cost(&table, &members, subset, v);
            if split == UNREACHABLE {
                continue;
            }

            // Graft at v itself (distance 0), then extend the grafted tree
            // along every known path out of v.
            let v_row = table.node_rows.get(&v);
            let subset_row = table.subset_rows.entry(subset).or_default();
            let current = subset_row.get(&v).copied().unwrap_or(UNREACHABLE);
            if split < current {
                subset_row.insert(v, split);
            }
            let Some(v_row) = v_row else { continue };
            for (&u, &distance) in v_row {
                let candidate = distance.saturating_add(split);
                let current = subset_row.get(&u).copied().unwrap_or(UNREACHABLE);
                if candidate < current {
                    subset_row.insert(u, candidate);
                }
            }
        }
    }

    // --- Phase 3: meet the root ---
    let full_mask = others.iter().fold(0u64, |mask, &bit| mask | bit);
    let mut best = UNREACHABLE;
    for &v in &vertices {
        let split = split_cost(&table, &others, full_mask, v);
        if split == UNREACHABLE {
            continue;
        }
        let to_root = table.subset_get(root_bit, v);
        if to_root == UNREACHABLE {
            continue;
        }
        best = best.min(to_root.saturating_add(split));
    }

    if best == UNREACHABLE {
        debug!(subsets = subset_count, "no finite root combination");
        return Err(Error::NoTree);
    }
    info!(
        cost = best,
        terminals = terminals.len(),
        vertices = vertices.len(),
        subsets = subset_count,
        "steiner cost computed"
    );
    Ok(best)
}

// ============================================================================
// Phase 1: per-terminal relaxation
// ============================================================================

fn seed_from_terminal(
    grid: &Grid,
    registry: &AspectRegistry,
    table: &mut DistanceTable,
    discovered: &mut HashSet<NodeKey>,
    terminal: Hex,
    cancel: &CancelToken,
) -> Result<()> {
    let terminal_aspect = grid.at(terminal)?;
    let terminal_cell = cell_of(terminal)?;
    let terminal_key = NodeKey::new(terminal_cell, terminal_aspect);
    let terminal_bit = terminal_cell.bit();

    table
        .subset_rows
        .entry(terminal_bit)
        .or_default()
        .insert(terminal_key, 0);
    table.node_set_min(terminal_key, terminal_key, 0);
    discovered.insert(terminal_key);

    let mut parents: HashMap<NodeKey, NodeKey> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierState {
        cost: 0,
        tier: registry.get(terminal_aspect)?.tier(),
        position: terminal,
        key: terminal_key,
        trail: grid.placement_mask(),
    });

    while let Some(state) = frontier.pop() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if table.subset_get(terminal_bit, state.key) < state.cost {
            continue;
        }
        let links = registry.get(state.key.aspect)?.links();

        for neighbor in state.position.neighbors() {
            if !grid.in_bounds(neighbor) {
                continue;
            }
            let cell = cell_of(neighbor)?;

            if state.trail & cell.bit() != 0 {
                // Already placed: traversable only when it is a terminal
                // whose existing aspect links to ours, and then for free.
                if !grid.is_terminal(neighbor) {
                    continue;
                }
                let existing = grid.at(neighbor)?;
                if !links.contains(&existing) {
                    continue;
                }
                settle(
                    registry,
                    table,
                    discovered,
                    &mut parents,
                    &mut frontier,
                    terminal_bit,
                    terminal_key,
                    state.key,
                    neighbor,
                    NodeKey::new(cell, existing),
                    state.cost,
                    state.trail,
                )?;
            } else {
                for &aspect in links {
                    settle(
                        registry,
                        table,
                        discovered,
                        &mut parents,
                        &mut frontier,
                        terminal_bit,
                        terminal_key,
                        state.key,
                        neighbor,
                        NodeKey::new(cell, aspect),
                        state.cost + 1,
                        state.trail | cell.bit(),
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// Record an improved distance from the seeding terminal to `key`, plus
/// the induced vertex-to-vertex distances along the relaxation path.
#[allow(clippy::too_many_arguments)]
fn settle(
    registry: &AspectRegistry,
    table: &mut DistanceTable,
    discovered: &mut HashSet<NodeKey>,
    parents: &mut HashMap<NodeKey, NodeKey>,
    frontier: &mut BinaryHeap<FrontierState>,
    terminal_bit: u64,
    terminal_key: NodeKey,
    from: NodeKey,
    position: Hex,
    key: NodeKey,
    cost: u32,
    trail: u64,
) -> Result<()> {
    if table.subset_get(terminal_bit, key) <= cost {
        return Ok(());
    }

    table
        .subset_rows
        .entry(terminal_bit)
        .or_default()
        .insert(key, cost);
    table.node_set_min(key, terminal_key, cost);
    parents.insert(key, from);

    // Cumulative costs back along the relaxation path: the distance from
    // `key` to an ancestor is the seed distance difference.
    let mut ancestor = from;
    let mut walked = 0usize;
    while ancestor != terminal_key {
        let seed_distance = table.subset_get(terminal_bit, ancestor);
        if seed_distance == UNREACHABLE {
            return invariant_violation("ancestor lost its seed distance");
        }
        table.node_set_min(key, ancestor, cost - seed_distance);
        ancestor = match parents.get(&ancestor) {
            Some(&parent) => parent,
            None => return invariant_violation("relaxation parent missing"),
        };
        walked += 1;
        if walked > CELL_COUNT * (u16::MAX as usize + 1) {
            return invariant_violation("relaxation parent walk did not terminate");
        }
    }

    frontier.push(FrontierState {
        cost,
        tier: registry.get(key.aspect)?.tier(),
        position,
        key,
        trail,
    });
    discovered.insert(key);
    Ok(())
}

fn cell_of(position: Hex) -> Result<CellIndex> {
    cell_index(position).ok_or(Error::OutOfBounds(position))
}

fn invariant_violation(message: &'static str) -> Result<()> {
    error!(message, "solver invariant violated");
    debug_assert!(false, "{message}");
    Err(Error::Internal(message))
}

// ============================================================================
// Tests
// ============================================================================
