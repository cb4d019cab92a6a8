//! Axial hex coordinates.
//!
//! Pure functions only: distance, neighbor enumeration, range queries and
//! pixel projection. Neighbor order is NW, NE, E, SE, SW, W and river edge
//! masks on tiles are indexed by it, so edge `i` on one tile always faces
//! edge `(i + 3) % 6` on the neighbor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};

/// Hex radius in pixels.
pub const HEX_SIZE: i32 = 42;

/// Pointy-top hex width in pixels (`sqrt(3) * HEX_SIZE`).
pub const HEX_WIDTH: Fixed = Fixed::from_bits(312_442_266_088);

/// Pointy-top hex height in pixels (`2 * HEX_SIZE`).
pub const HEX_HEIGHT: Fixed = Fixed::const_from_int(2 * HEX_SIZE as i64);

/// Axial offsets in edge order: NW, NE, E, SE, SW, W.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 6] = [(0, -1), (1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0)];

/// Axial hex coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Hex distance: `(|dq| + |dq + dr| + |dr|) / 2`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.unsigned_abs() + (dq + dr).unsigned_abs() + dr.unsigned_abs()) / 2
    }

    /// The six neighbors in edge order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        NEIGHBOR_OFFSETS.map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
    }

    /// Edge index pointing at `other`, if it is adjacent.
    #[must_use]
    pub fn edge_towards(self, other: Self) -> Option<usize> {
        let delta = (other.q - self.q, other.r - self.r);
        NEIGHBOR_OFFSETS.iter().position(|&offset| offset == delta)
    }

    /// Whether `other` shares an edge with this coordinate.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.edge_towards(other).is_some()
    }

    /// All coordinates within `radius` (inclusive), in ascending `(q, r)` order.
    #[must_use]
    pub fn within(self, radius: u32) -> Vec<Self> {
        let radius = radius as i32;
        let mut result = Vec::new();
        for dq in -radius..=radius {
            for dr in (-radius).max(-dq - radius)..=radius.min(-dq + radius) {
                result.push(Self::new(self.q + dq, self.r + dr));
            }
        }
        result
    }

    /// Pixel center of this hex for a pointy-top layout.
    #[must_use]
    pub fn to_pixel(self) -> Vec2Fixed {
        let q = Fixed::from_num(self.q);
        let r = Fixed::from_num(self.r);
        let x = HEX_WIDTH * (q + r / 2);
        let y = HEX_HEIGHT * r * 3 / 4;
        Vec2Fixed::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// The edge index on the neighbor that faces back across edge `edge`.
#[must_use]
pub const fn opposite_edge(edge: usize) -> usize {
    (edge + 3) % 6
}

/// Hex distance between two coordinates.
#[must_use]
pub const fn distance(a: Coord, b: Coord) -> u32 {
    a.distance(b)
}

/// The six neighbors of `(q, r)` in edge order.
#[must_use]
pub fn neighbors(q: i32, r: i32) -> [Coord; 6] {
    Coord::new(q, r).neighbors()
}
