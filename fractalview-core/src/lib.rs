pub mod budget;
pub mod color_table;
pub mod config;
pub mod diagnostics;
pub mod geometry;
pub mod navigation;
pub mod palette;
pub mod precision;
pub mod supersampling;
pub mod view;

pub use budget::{IterationBudget, DEFAULT_ITERATIONS, ITERATION_STEP, MIN_ITERATIONS};
pub use color_table::ColorTable;
pub use config::{ConfigError, RenderConfig, DEFAULT_ENTRY_POINT};
pub use diagnostics::{error_line, FrameDiagnostics};
pub use geometry::{round_up_to_block, LaunchGeometry, BLOCK_SIZE};
pub use navigation::{NavigationEffect, NavigationInput, ViewerState};
pub use palette::Palette;
pub use precision::Precision;
pub use supersampling::{Supersampling, MAX_SUPERSAMPLING};
pub use view::{DeviceView, ViewRect};
