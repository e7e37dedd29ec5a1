//! Flat-top ASCII honeycomb rendering.
//!
//! Pure presentation: walks the board row pair by row pair and draws each
//! cell as a seven-column hexagon. Occupied cells show their aspect name
//! (split across the two rows when it is long); blocked holes show `*`.
//! No I/O — the caller decides where the string goes.

use std::fmt::Write;

use crate::model::{AspectRegistry, Grid, Hex};

const CELL_WIDTH: usize = 7;

/// Render the grid as a honeycomb of side `grid.side_length()`.
pub fn render(grid: &Grid, registry: &AspectRegistry) -> String {
    let side_length = grid.side_length();
    let radius = side_length - 1;
    let mut out = String::new();

    let blank = " ".repeat(radius as usize * CELL_WIDTH);
    let _ = writeln!(out, "{blank}  _____");
    let _ = writeln!(out, "{blank} /     \\");

    for y in -radius * 2..=radius * 2 {
        let mut row1 = String::new();
        let mut row2 = String::new();

        if y.abs() > radius {
            let blank2 = " ".repeat((y.abs() - side_length) as usize * CELL_WIDTH);
            if y < 0 {
                row1.push_str(&blank2);
                row1.push_str("  _____");
                row2.push_str(&blank2);
                row2.push_str(" /     ");
            } else {
                row1.push_str(&blank2);
                row1.push_str(" \\_____");
                row2.push_str(&blank2);
                row2.push_str("       ");
            }
        }

        let offset_row = ((y - (radius % 2)) % 2).abs();
        let width = if y.abs() < radius {
            side_length - offset_row
        } else {
            2 * radius + 1 - y.abs()
        };

        for x in 0..width {
            let i = if y <= -radius {
                y + radius - x
            } else {
                ((y + radius) / 2).min(radius) - x
            };
            let j = 1 - width + 2 * x;
            let position = Hex::new(i, j);

            let (part1, part2) = cell_label(grid, registry, position);
            let padding1 = CELL_WIDTH.saturating_sub(part1.len());
            let padding2 = CELL_WIDTH.saturating_sub(part2.len());

            if x == 0 && y.abs() < radius && offset_row == 1 {
                row1.push_str(" \\_____");
                row2.push_str(" /     ");
            }

            row1.push('/');
            row1.push_str(&" ".repeat(padding1 / 2));
            row1.push_str(&part1);
            row1.push_str(&" ".repeat(padding1.div_ceil(2)));
            row2.push('\\');
            row2.push_str(&" ".repeat(padding2 / 2));
            row2.push_str(&part2);
            row2.push_str(&" ".repeat(padding2.div_ceil(2)));

            if x < width - 1 {
                row1.push_str("\\_____");
                row2.push_str("/     ");
            } else if y.abs() <= radius {
                row1.push('\\');
                row2.push('/');
                if offset_row == 1 {
                    row1.push_str("_____/");
                    row2.push_str("     \\");
                }
            }
        }

        if y.abs() > radius {
            if y < 0 {
                row1.push_str("\\_____");
                row2.push_str("/     \\");
            } else {
                row1.push_str("\\_____/");
                row2.push('/');
            }
        }

        let _ = writeln!(out, "{row1}");
        let _ = writeln!(out, "{row2}");
    }

    let _ = writeln!(out, "{blank} \\_____/");
    out
}

/// The two text halves shown inside a cell.
fn cell_label(grid: &Grid, registry: &AspectRegistry, position: Hex) -> (String, String) {
    if !grid.contains(position) {
        return (String::new(), String::new());
    }
    let Some(aspect) = grid.aspect_at(position) else {
        // Occupied with no aspect: a hole.
        return ("*".to_string(), String::new());
    };
    let name = registry
        .get(aspect)
        .map(|aspect| aspect.name().to_string())
        .unwrap_or_else(|_| "?".to_string());
    if name.len() > CELL_WIDTH {
        let half = name.len() / 2;
        let first = name[..name.len().div_ceil(2)].to_string();
        let second = name[half..].to_string();
        (first, second)
    } else {
        (name, String::new())
    }
}

// ============================================================================
// Tests
// ============================================================================
