//! # leyline — Aspect Chains and Steiner Trees on Hex Boards
//!
//! Computes minimum-cost connections between fixed terminal cells on a
//! bounded hexagonal board, where every cell holds a typed aspect from a
//! combination hierarchy and two cells only connect when their aspects
//! are related (parent, child, or sibling-through-a-parent).
//!
//! ## Design Principles
//!
//! 1. **Dense ids, no pointers**: aspects and cells are small integers
//!    into append-only tables; composite search keys are plain value pairs
//! 2. **Bit-packed occupancy**: every in-bounds cell owns one bit of a
//!    `u64`, so a whole search trail is a single mask
//! 3. **One transition model, two solvers**: the chain search and the
//!    Steiner solver share placement semantics and differ only in what
//!    they optimize
//!
//! ## Quick Start
//!
//! ```rust
//! use leyline::{AspectRegistry, Grid, Hex, Solution};
//!
//! # fn example() -> leyline::Result<()> {
//! let mut aspects = AspectRegistry::new();
//! let fire = aspects.create_primal("fire")?;
//! let water = aspects.create_primal("water")?;
//! aspects.create_compound("order", fire, water)?;
//!
//! let mut grid = Grid::new(3)?;
//! grid.add(Hex::new(-1, 0), fire)?;
//! grid.add(Hex::new(1, 0), water)?;
//! grid.add_terminals([Hex::new(-1, 0), Hex::new(1, 0)])?;
//!
//! match leyline::solve(&mut grid, &aspects)? {
//!     Solution::Chain(chain) => println!("connected in {} placements", chain.cost),
//!     Solution::Tree { cost } => println!("spanned for {cost}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Solvers
//!
//! | Terminals | Solver | Result |
//! |-----------|--------|--------|
//! | 2 | best-first chain search | ordered placements, applied to the grid |
//! | 3..=15 | Dreyfus–Wagner | minimum total cost |
//! | otherwise | — | rejected before solving |

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod config;
pub mod model;
pub mod render;
pub mod solver;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Aspect, AspectId, AspectRegistry, CellIndex, Grid, Hex};

// ============================================================================
// Re-exports: Solvers
// ============================================================================

pub use solver::{CancelToken, Chain, NodeKey, Placement};

// ============================================================================
// Re-exports: Configuration
// ============================================================================

pub use config::Config;

// ============================================================================
// Solving a board
// ============================================================================

/// Outcome of [`solve`], shaped by the terminal count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// Exactly two terminals: the connecting chain, already materialized
    /// into the grid.
    Chain(Chain),
    /// Three to fifteen terminals: the minimum spanning-tree cost. Path
    /// reconstruction is an extension point, not part of this result.
    Tree { cost: u32 },
}

/// Dispatch on terminal count and run the matching solver.
///
/// Two terminals run the chain search and insert the discovered chain
/// into `grid`; 3..=15 terminals run the Steiner solver read-only. Any
/// other count is rejected without searching.
pub fn solve(grid: &mut Grid, registry: &AspectRegistry) -> Result<Solution> {
    solve_cancellable(grid, registry, &CancelToken::new())
}

/// [`solve`], polling `cancel` inside both solvers' frontier loops.
pub fn solve_cancellable(
    grid: &mut Grid,
    registry: &AspectRegistry,
    cancel: &CancelToken,
) -> Result<Solution> {
    let count = grid.terminals().len();
    if count == 2 {
        let start = grid.terminals()[0];
        let end = grid.terminals()[1];
        let chain = solver::chain::solve_cancellable(grid, registry, start, end, cancel)?;
        for placement in &chain.placements {
            if !grid.is_terminal(placement.position) {
                grid.add(placement.position, placement.aspect)?;
            }
        }
        Ok(Solution::Chain(chain))
    } else if (solver::steiner::MIN_TERMINALS..=solver::steiner::MAX_TERMINALS).contains(&count) {
        let root = grid.terminals()[0];
        let cost = solver::steiner::solve_with_root(grid, registry, root, cancel)?;
        Ok(Solution::Tree { cost })
    } else {
        Err(Error::TerminalCount(count))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --- Configuration / graph: invalid input, fatal to the operation ---
    #[error("side length {0} is outside the supported 1..=5 range")]
    SideLength(i32),

    #[error("position {0} is out of bounds")]
    OutOfBounds(Hex),

    #[error("position {0} is already occupied")]
    Occupied(Hex),

    #[error("position {0} is already a terminal")]
    TerminalOccupied(Hex),

    #[error("no aspect placed at {0}")]
    Vacant(Hex),

    #[error("aspect \"{0}\" already exists")]
    DuplicateAspect(String),

    #[error("unknown aspect \"{0}\"")]
    UnknownAspect(String),

    #[error("aspect id {0} is out of range")]
    AspectRange(AspectId),

    #[error("compound aspect parents must be distinct")]
    IdenticalParents,

    #[error("config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // --- Solver: expected, typed outcomes ---
    #[error("unsupported terminal count {0}: 2 connects a chain, 3..=15 spans a tree")]
    TerminalCount(usize),

    #[error("{0} is not a terminal")]
    NotATerminal(Hex),

    #[error("no compatible chain connects the terminals")]
    NoPath,

    #[error("no compatible tree spans the terminals")]
    NoTree,

    #[error("solve cancelled")]
    Cancelled,

    // --- Internal: relaxation bookkeeping bugs, not search outcomes ---
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================
