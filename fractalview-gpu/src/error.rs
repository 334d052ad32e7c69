//! GPU pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    // Initialization: fatal for the session.
    #[error("Invalid configuration: {0}")]
    Config(#[from] fractalview_core::ConfigError),

    #[error("No suitable devices found (GPU adapter on any backend)")]
    NoDevice,

    #[error("Create context failed: {0}")]
    ContextCreation(String),

    #[error("Create queue failed: {0}")]
    QueueCreation(#[from] wgpu::RequestDeviceError),

    #[error("Failed to open kernel source {}: {source}", .path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build error:\n{log}")]
    ProgramBuild { log: String },

    #[error("Failed to load kernel '{entry_point}': {reason}")]
    KernelResolution { entry_point: String, reason: String },

    // Per frame / resize: reported and retried.
    #[error("Out of video memory: {0}")]
    Allocation(String),

    #[error("{0} not bound")]
    NotBound(&'static str),

    #[error("Failed to allocate buffer: {0}")]
    Buffer(String),

    #[error("Acquire surface failed: {0}")]
    Acquire(String),

    #[error("Kernel dispatch failed: {0}")]
    Dispatch(String),

    #[error("Release surface failed: {0}")]
    Release(String),
}

impl PipelineError {
    /// Initialization errors leave the pipeline unusable until it is rebuilt.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_)
                | PipelineError::NoDevice
                | PipelineError::ContextCreation(_)
                | PipelineError::QueueCreation(_)
                | PipelineError::KernelSource { .. }
                | PipelineError::ProgramBuild { .. }
                | PipelineError::KernelResolution { .. }
        )
    }
}
