//! Supersampling level: render at `2^s` times the displayed resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest supported supersampling exponent (8x per axis).
pub const MAX_SUPERSAMPLING: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("supersampling exponent {0} exceeds the maximum of {MAX_SUPERSAMPLING}")]
pub struct SupersamplingOutOfRange(pub u8);

/// Supersampling exponent `s` in `0..=3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Supersampling(u8);

impl Supersampling {
    pub fn new(exponent: u8) -> Option<Self> {
        (exponent <= MAX_SUPERSAMPLING).then_some(Self(exponent))
    }

    pub fn exponent(self) -> u8 {
        self.0
    }

    /// Per-axis scale factor `2^s`.
    pub fn factor(self) -> u32 {
        1 << self.0
    }

    pub fn increased(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn decreased(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Texel dimensions for a base (displayed) size.
    pub fn scale(self, width: u32, height: u32) -> (u32, u32) {
        let f = self.factor();
        (width.saturating_mul(f), height.saturating_mul(f))
    }
}

impl TryFrom<u8> for Supersampling {
    type Error = SupersamplingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(SupersamplingOutOfRange(value))
    }
}

impl From<Supersampling> for u8 {
    fn from(level: Supersampling) -> Self {
        level.0
    }
}
