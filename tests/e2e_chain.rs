//! End-to-end tests for the two-terminal chain search.
//!
//! Each test builds a registry and grid through the public API, solves
//! through the top-level dispatcher, and checks both the reported chain
//! and the mutated board.

use leyline::{AspectRegistry, Error, Grid, Hex, Solution};

// ============================================================================
// Helper: fire / water / order registry
// ============================================================================

/// `order = fire + water` is the only compound; fire and water only
/// connect through it.
fn fire_water_order() -> AspectRegistry {
    let mut registry = AspectRegistry::new();
    let fire = registry.create_primal("fire").unwrap();
    let water = registry.create_primal("water").unwrap();
    registry.create_compound("order", fire, water).unwrap();
    registry
}

// ============================================================================
// 1. Two primals with no shared compound cannot connect
// ============================================================================

#[test]
fn test_unbridgeable_primals_report_no_path() {
    let mut registry = AspectRegistry::new();
    let fire = registry.create_primal("fire").unwrap();
    let water = registry.create_primal("water").unwrap();

    // Side length 3, terminals three hexes apart, no compound links them.
    let mut grid = Grid::new(3).unwrap();
    grid.add(Hex::new(-1, -1), fire).unwrap();
    grid.add(Hex::new(2, -1), water).unwrap();
    grid.add_terminals([Hex::new(-1, -1), Hex::new(2, -1)]).unwrap();
    assert_eq!(Hex::distance(Hex::new(-1, -1), Hex::new(2, -1)), 3);

    assert!(matches!(
        leyline::solve(&mut grid, &registry),
        Err(Error::NoPath),
    ));
}

// ============================================================================
// 2. A terminal pair that is directly compatible closes for free
// ============================================================================

#[test]
fn test_adjacent_parent_and_child_connect_without_placements() {
    let registry = fire_water_order();
    let fire = registry.id_of("fire").unwrap();
    let order = registry.id_of("order").unwrap();

    let mut grid = Grid::new(3).unwrap();
    grid.add(Hex::new(0, -1), fire).unwrap();
    grid.add(Hex::new(0, 0), order).unwrap();
    grid.add_terminals([Hex::new(0, -1), Hex::new(0, 0)]).unwrap();

    let occupied_before = grid.iter().count();
    let Solution::Chain(chain) = leyline::solve(&mut grid, &registry).unwrap() else {
        panic!("expected a chain solution");
    };

    assert_eq!(chain.cost, 0);
    assert_eq!(chain.len(), 2);
    // Nothing new was placed.
    assert_eq!(grid.iter().count(), occupied_before);
}

// ============================================================================
// 3. A gap is bridged and materialized into the grid
// ============================================================================

#[test]
fn test_solved_chain_is_materialized() {
    let registry = fire_water_order();
    let fire = registry.id_of("fire").unwrap();
    let water = registry.id_of("water").unwrap();
    let order = registry.id_of("order").unwrap();

    let mut grid = Grid::new(4).unwrap();
    grid.add(Hex::new(-2, 0), fire).unwrap();
    grid.add(Hex::new(2, 0), water).unwrap();
    grid.add_terminals([Hex::new(-2, 0), Hex::new(2, 0)]).unwrap();

    let Solution::Chain(chain) = leyline::solve(&mut grid, &registry).unwrap() else {
        panic!("expected a chain solution");
    };

    // Four hexes apart: three intermediate placements.
    assert_eq!(chain.cost, 3);
    assert_eq!(chain.len(), 5);
    assert_eq!(chain.start().unwrap().position, Hex::new(-2, 0));
    assert_eq!(chain.end().unwrap().position, Hex::new(2, 0));

    // The first hop off a fire terminal can only be order.
    assert_eq!(chain.placements[1].aspect, order);

    for placement in &chain.placements {
        assert_eq!(grid.aspect_at(placement.position), Some(placement.aspect));
    }
}

// ============================================================================
// 4. No cell is used twice
// ============================================================================

#[test]
fn test_chain_positions_are_distinct() {
    let registry = fire_water_order();
    let fire = registry.id_of("fire").unwrap();
    let water = registry.id_of("water").unwrap();

    let mut grid = Grid::new(4).unwrap();
    grid.add(Hex::new(-3, 0), fire).unwrap();
    grid.add(Hex::new(3, 0), water).unwrap();
    grid.add_terminals([Hex::new(-3, 0), Hex::new(3, 0)]).unwrap();

    let Solution::Chain(chain) = leyline::solve(&mut grid, &registry).unwrap() else {
        panic!("expected a chain solution");
    };

    let mut seen = std::collections::HashSet::new();
    for placement in &chain.placements {
        assert!(seen.insert(placement.position));
    }
}

// ============================================================================
// 5. Holes block the straight route
// ============================================================================

#[test]
fn test_blocked_cells_are_routed_around() {
    let registry = fire_water_order();
    let fire = registry.id_of("fire").unwrap();
    let water = registry.id_of("water").unwrap();

    let mut grid = Grid::new(3).unwrap();
    grid.add(Hex::new(-2, 0), fire).unwrap();
    grid.add(Hex::new(2, 0), water).unwrap();
    // Wall out the middle of the direct route.
    grid.block(Hex::new(0, 0)).unwrap();
    grid.add_terminals([Hex::new(-2, 0), Hex::new(2, 0)]).unwrap();

    let Solution::Chain(chain) = leyline::solve(&mut grid, &registry).unwrap() else {
        panic!("expected a chain solution");
    };

    assert!(chain.placements.iter().all(|p| p.position != Hex::new(0, 0)));
    // Detouring costs more than the straight three placements would have.
    assert!(chain.cost > 3);
}

// ============================================================================
// 6. Equal-length routes prefer the lower tier
// ============================================================================

#[test]
fn test_tie_between_equal_cost_routes_prefers_low_tier() {
    let mut registry = AspectRegistry::new();
    let fire = registry.create_primal("fire").unwrap();
    let water = registry.create_primal("water").unwrap();
    let order = registry.create_compound("order", fire, water).unwrap();
    // A heavier aspect that also links to fire.
    let blaze = registry.create_compound("blaze", order, fire).unwrap();
    assert!(registry.get(blaze).unwrap().tier() > registry.get(order).unwrap().tier());

    let mut grid = Grid::new(3).unwrap();
    grid.add(Hex::new(-1, 0), fire).unwrap();
    grid.add(Hex::new(1, 0), fire).unwrap();
    grid.add_terminals([Hex::new(-1, 0), Hex::new(1, 0)]).unwrap();

    let Solution::Chain(chain) = leyline::solve(&mut grid, &registry).unwrap() else {
        panic!("expected a chain solution");
    };

    // Both order and blaze bridge the gap at cost 1; the frontier tier
    // tie-break must surface the cheaper aspect.
    assert_eq!(chain.cost, 1);
    assert_eq!(chain.placements[1].aspect, order);
}
