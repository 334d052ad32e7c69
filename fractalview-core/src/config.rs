//! Renderer configuration.
//!
//! Holds everything needed to bring up a renderer: which kernel to compile,
//! its entry point, and the initial interactive settings. Loaded from JSON;
//! every field has a default so partial files are accepted.

use crate::budget::{IterationBudget, DEFAULT_ITERATIONS};
use crate::navigation::ViewerState;
use crate::palette::Palette;
use crate::supersampling::Supersampling;
use crate::view::ViewRect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Entry point name of the bundled Mandelbrot kernel.
pub const DEFAULT_ENTRY_POINT: &str = "mandelbrot";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Budget(#[from] crate::budget::BudgetTooSmall),

    #[error(transparent)]
    Supersampling(#[from] crate::supersampling::SupersamplingOutOfRange),

    #[error("view rectangle {0:?} is empty or not finite")]
    DegenerateView(ViewRect),

    #[error("kernel entry point name is empty")]
    EmptyEntryPoint,
}

/// Startup configuration for a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Kernel source file. `None` selects the kernel bundled with the GPU crate.
    pub kernel_path: Option<PathBuf>,
    pub entry_point: String,
    pub view: ViewRect,
    pub max_iterations: u32,
    pub palette: Palette,
    /// Supersampling exponent (0-3).
    pub supersampling: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            kernel_path: None,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            view: ViewRect::default(),
            max_iterations: DEFAULT_ITERATIONS,
            palette: Palette::default(),
            supersampling: 0,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewer_state().map(|_| ())
    }

    /// Initial interactive settings described by this config.
    pub fn viewer_state(&self) -> Result<ViewerState, ConfigError> {
        if self.entry_point.trim().is_empty() {
            return Err(ConfigError::EmptyEntryPoint);
        }
        if self.view.is_degenerate() {
            return Err(ConfigError::DegenerateView(self.view));
        }

        Ok(ViewerState {
            view: self.view,
            budget: IterationBudget::try_from(self.max_iterations)?,
            palette: self.palette,
            supersampling: Supersampling::try_from(self.supersampling)?,
        })
    }
}
