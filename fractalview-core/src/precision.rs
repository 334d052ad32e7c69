//! Floating-point precision mode of the compiled kernel.
//!
//! The kernel source writes all complex-plane arithmetic in terms of a `Real`
//! type alias. The program builder prepends exactly one directive line that
//! binds `Real` to `f32` or `f64`, which is also what decides how many bytes
//! the view rectangle occupies on the device.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directive enabling double precision in the kernel source.
pub const DOUBLE_DIRECTIVE: &str = "alias Real = f64;";

/// Directive selecting the single precision default.
pub const SINGLE_DIRECTIVE: &str = "alias Real = f32;";

/// Scalar width used by the kernel for view coordinates and iteration math.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl Precision {
    /// Picks the widest precision the device can execute.
    pub fn from_double_support(supports_double: bool) -> Self {
        if supports_double {
            Precision::Double
        } else {
            Precision::Single
        }
    }

    /// Human-readable label shown in diagnostics ("Single" / "Double").
    pub fn label(&self) -> &'static str {
        match self {
            Precision::Single => "Single",
            Precision::Double => "Double",
        }
    }

    /// Size in bytes of one device scalar.
    pub fn scalar_size(&self) -> usize {
        match self {
            Precision::Single => std::mem::size_of::<f32>(),
            Precision::Double => std::mem::size_of::<f64>(),
        }
    }

    /// Size in bytes of the four-scalar view buffer.
    pub fn view_buffer_size(&self) -> usize {
        4 * self.scalar_size()
    }

    pub fn directive(&self) -> &'static str {
        match self {
            Precision::Single => SINGLE_DIRECTIVE,
            Precision::Double => DOUBLE_DIRECTIVE,
        }
    }

    /// Returns `source` with the precision directive as its first line.
    pub fn apply_directive(&self, source: &str) -> String {
        let mut text = String::with_capacity(source.len() + 32);
        text.push_str(self.directive());
        text.push('\n');
        text.push_str(source);
        text
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
