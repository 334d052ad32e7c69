//! Read-only diagnostic text shown next to the rendered fractal.

use crate::precision::Precision;
use std::fmt::Display;
use std::time::Duration;

/// Snapshot of the values displayed in the info overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDiagnostics {
    pub iteration_budget: u32,
    pub supersampling_factor: u32,
    pub frame_time: Option<Duration>,
    pub precision: Precision,
}

impl FrameDiagnostics {
    /// Overlay lines, top to bottom. The empty line separates settings from
    /// measurements.
    pub fn lines(&self) -> Vec<String> {
        let frame_time = match self.frame_time {
            Some(t) => format!("Frame time: {}ms", t.as_millis()),
            None => "Frame time: -".to_string(),
        };

        vec![
            format!("Max iterations (+/-): {}", self.iteration_budget),
            format!("Supersampling (a/d): {}x", self.supersampling_factor),
            String::new(),
            frame_time,
            format!("Precision: {}", self.precision),
        ]
    }
}

/// Line displayed in place of the fractal when a frame failed.
pub fn error_line(error: &impl Display) -> String {
    format!("Error: {error}")
}
