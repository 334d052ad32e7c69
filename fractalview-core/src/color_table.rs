//! Precomputed iteration-to-color lookup table.

use crate::budget::IterationBudget;
use crate::palette::Palette;

/// RGBA lookup table indexed by iteration count.
///
/// Entry `i` holds the palette color at `t = i / budget`. The table length is
/// the budget it was generated for; a table is stale once the budget or the
/// palette changes and must be regenerated as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTable {
    palette: Palette,
    budget: IterationBudget,
    entries: Vec<[f32; 4]>,
}

impl ColorTable {
    pub fn generate(palette: Palette, budget: IterationBudget) -> Self {
        let n = budget.get();
        let entries = (0..n)
            .map(|i| palette.color_at(i as f64 / n as f64))
            .collect();

        Self {
            palette,
            budget,
            entries,
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    pub fn entries(&self) -> &[[f32; 4]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this table was generated for exactly these settings.
    pub fn is_current(&self, palette: Palette, budget: IterationBudget) -> bool {
        self.palette == palette && self.budget == budget
    }

    /// Table contents as tightly packed `vec4<f32>` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}
