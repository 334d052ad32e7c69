//! Fixed polynomial color palettes.

use serde::{Deserialize, Serialize};

/// One of the two built-in palettes.
///
/// Both are built from the same three Bernstein-like terms of the normalized
/// iteration position `t`; they differ only in which channel gets the term
/// peaking late (`9(1-t)t³`) and which the one peaking early (`8.5(1-t)³t`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Red for slow escapes, blue for fast ones.
    #[default]
    Fire,
    /// Fire with red and blue swapped.
    Ocean,
}

impl Palette {
    /// RGBA color for a normalized position `t` in `[0, 1)`.
    pub fn color_at(self, t: f64) -> [f32; 4] {
        let s = 1.0 - t;
        let late = 9.0 * s * t * t * t;
        let middle = 15.0 * s * s * t * t;
        let early = 8.5 * s * s * s * t;

        match self {
            Palette::Fire => [late as f32, middle as f32, early as f32, 1.0],
            Palette::Ocean => [early as f32, middle as f32, late as f32, 1.0],
        }
    }

    /// The other palette.
    pub fn toggled(self) -> Self {
        match self {
            Palette::Fire => Palette::Ocean,
            Palette::Ocean => Palette::Fire,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Fire => "Fire",
            Palette::Ocean => "Ocean",
        }
    }
}
