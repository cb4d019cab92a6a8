//! Fixed-point math utilities for deterministic simulation.
//!
//! Yields, stockpiles and combat arithmetic use fixed-point numbers so
//! that fractional quantities (half a food from a pasture, 1.5x ranged
//! damage) accumulate identically on every platform.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Build an exact fraction `num / den` in fixed-point.
///
/// # Panics
///
/// Panics if `den` is zero.
#[must_use]
pub fn ratio(num: i32, den: i32) -> Fixed {
    Fixed::from_num(num) / Fixed::from_num(den)
}

/// Round a fixed-point value down to a whole number.
#[must_use]
pub fn floor_i32(value: Fixed) -> i32 {
    value.floor().to_num::<i32>()
}

/// Fixed-point 2D vector, used for pixel projection of hex centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_exact_for_halves() {
        assert_eq!(ratio(1, 2), Fixed::from_num(0.5));
        assert_eq!(ratio(3, 2) * Fixed::from_num(30), Fixed::from_num(45));
    }

    #[test]
    fn test_floor_rounds_down() {
        assert_eq!(floor_i32(ratio(35, 2)), 17);
        assert_eq!(floor_i32(ratio(-1, 2)), -1);
        assert_eq!(floor_i32(Fixed::from_num(12)), 12);
    }

    #[test]
    fn test_serde_roundtrip_preserves_bits() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper(#[serde(with = "fixed_serde")] Fixed);

        let value = ratio(3, 10);
        let bytes = bincode::serialize(&Wrapper(value)).unwrap();
        let Wrapper(back) = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, value);
    }
}
