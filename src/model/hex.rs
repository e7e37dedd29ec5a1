//! Axial hex coordinate on a flat-top honeycomb.
//!
//! The third cube coordinate is derived: `k = -i - j`. Equality and hashing
//! depend only on `(i, j)`.

use serde::{Deserialize, Serialize};

/// A hex-grid point in axial coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub i: i32,
    pub j: i32,
}

impl Hex {
    pub const ZERO: Hex = Hex::new(0, 0);

    /// The six unit directions, in ring order.
    pub const DIRECTIONS: [Hex; 6] = [
        Hex::new(1, 0),
        Hex::new(1, -1),
        Hex::new(0, -1),
        Hex::new(-1, 0),
        Hex::new(-1, 1),
        Hex::new(0, 1),
    ];

    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Derived cube coordinate.
    pub const fn k(self) -> i32 {
        -self.i - self.j
    }

    /// Hex (Chebyshev-on-cube) distance between two points.
    pub const fn distance(a: Hex, b: Hex) -> i32 {
        let di = (a.i - b.i).abs();
        let dj = (a.j - b.j).abs();
        let dk = (a.k() - b.k()).abs();
        let m = if di > dj { di } else { dj };
        if m > dk { m } else { dk }
    }

    /// The six adjacent positions, in `DIRECTIONS` order.
    pub fn neighbors(self) -> [Hex; 6] {
        Self::DIRECTIONS.map(|d| self + d)
    }
}

impl std::ops::Add for Hex {
    type Output = Hex;
    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.i + rhs.i, self.j + rhs.j)
    }
}

impl std::ops::AddAssign for Hex {
    fn add_assign(&mut self, rhs: Hex) {
        self.i += rhs.i;
        self.j += rhs.j;
    }
}

impl std::ops::Sub for Hex {
    type Output = Hex;
    fn sub(self, rhs: Hex) -> Hex {
        Hex::new(self.i - rhs.i, self.j - rhs.j)
    }
}

impl std::ops::SubAssign for Hex {
    fn sub_assign(&mut self, rhs: Hex) {
        self.i -= rhs.i;
        self.j -= rhs.j;
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hex({}, {}, {})", self.i, self.j, self.k())
    }
}

// ============================================================================
// Tests
// ============================================================================
