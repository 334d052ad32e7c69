//! Kernel loading, precision injection and compilation.

use crate::buffers::kernel_bind_group_layout;
use crate::device::GpuSession;
use crate::error::PipelineError;
use fractalview_core::Precision;
use std::borrow::Cow;
use std::path::PathBuf;

/// Bundled escape-time Mandelbrot kernel, entry point `mandelbrot`.
pub const MANDELBROT_KERNEL: &str = include_str!("shaders/mandelbrot.wgsl");

/// Where kernel source text comes from.
#[derive(Clone, Debug)]
pub enum KernelSource {
    File(PathBuf),
    Text { name: String, text: String },
}

impl KernelSource {
    pub fn bundled() -> Self {
        KernelSource::Text {
            name: "mandelbrot.wgsl".to_string(),
            text: MANDELBROT_KERNEL.to_string(),
        }
    }

    /// Label used for the shader module and in diagnostics.
    pub fn name(&self) -> String {
        match self {
            KernelSource::File(path) => path.display().to_string(),
            KernelSource::Text { name, .. } => name.clone(),
        }
    }

    pub fn load(&self) -> Result<String, PipelineError> {
        match self {
            KernelSource::File(path) => {
                std::fs::read_to_string(path).map_err(|source| PipelineError::KernelSource {
                    path: path.clone(),
                    source,
                })
            }
            KernelSource::Text { text, .. } => Ok(text.clone()),
        }
    }
}

/// Whether `source` defines a function called `entry_point`.
pub fn declares_function(source: &str, entry_point: &str) -> bool {
    let mut tokens = source
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty());

    while let Some(token) = tokens.next() {
        if token == "fn" && tokens.next() == Some(entry_point) {
            return true;
        }
    }
    false
}

/// Format compilation messages as a build log, one message per line.
fn build_log(info: &wgpu::CompilationInfo) -> Option<String> {
    let has_errors = info
        .messages
        .iter()
        .any(|m| m.message_type == wgpu::CompilationMessageType::Error);
    if !has_errors {
        return None;
    }

    let lines: Vec<String> = info
        .messages
        .iter()
        .map(|m| match &m.location {
            Some(loc) => format!(
                "{}:{}: {:?}: {}",
                loc.line_number, loc.line_position, m.message_type, m.message
            ),
            None => format!("{:?}: {}", m.message_type, m.message),
        })
        .collect();
    Some(lines.join("\n"))
}

/// A compiled kernel with one resolved entry point.
pub struct KernelProgram {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    entry_point: String,
    precision: Precision,
}

impl KernelProgram {
    /// Load, precision-tag and compile `source`, then resolve `entry_point`.
    pub fn build(
        session: &GpuSession,
        source: &KernelSource,
        entry_point: &str,
    ) -> Result<Self, PipelineError> {
        let precision = session.precision();
        let name = source.name();
        let text = precision.apply_directive(&source.load()?);

        let (module, error) = session.capture_errors(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name.as_str()),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(text.as_str())),
            })
        });

        let info = pollster::block_on(module.get_compilation_info());
        if let Some(log) = build_log(&info) {
            return Err(PipelineError::ProgramBuild { log });
        }
        if let Some(e) = error {
            return Err(PipelineError::ProgramBuild { log: e.to_string() });
        }

        if !declares_function(&text, entry_point) {
            return Err(PipelineError::KernelResolution {
                entry_point: entry_point.to_string(),
                reason: format!("{name} has no function with that name"),
            });
        }

        let bind_group_layout = kernel_bind_group_layout(&session.device);
        let pipeline_layout = session
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("kernel_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let (pipeline, error) = session.capture_errors(|device| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        });
        if let Some(e) = error {
            return Err(PipelineError::KernelResolution {
                entry_point: entry_point.to_string(),
                reason: e.to_string(),
            });
        }

        log::info!("Built kernel '{entry_point}' from {name} ({precision} precision)");

        Ok(Self {
            pipeline,
            bind_group_layout,
            entry_point: entry_point.to_string(),
            precision,
        })
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Precision the kernel was compiled for.
    pub fn precision(&self) -> Precision {
        self.precision
    }
}
