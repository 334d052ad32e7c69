//! Kernel argument layout and the device buffers bound to it.

use crate::device::{GpuSession, SURFACE_FORMAT};
use crate::error::PipelineError;
use fractalview_core::{ColorTable, DeviceView, IterationBudget, Palette, Precision};
use wgpu::util::DeviceExt;

// Kernel argument slots, in the fixed order of the kernel signature.
pub const TARGET_BINDING: u32 = 0;
pub const WIDTH_BINDING: u32 = 1;
pub const HEIGHT_BINDING: u32 = 2;
pub const VIEW_BINDING: u32 = 3;
pub const ITERATIONS_BINDING: u32 = 4;
pub const COLORS_BINDING: u32 = 5;

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn read_only_storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Bind group layout every kernel must match.
pub fn kernel_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("kernel_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: TARGET_BINDING,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: SURFACE_FORMAT,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            uniform_entry(WIDTH_BINDING),
            uniform_entry(HEIGHT_BINDING),
            read_only_storage_entry(VIEW_BINDING),
            uniform_entry(ITERATIONS_BINDING),
            read_only_storage_entry(COLORS_BINDING),
        ],
    })
}

/// Color table uploaded as a read-only storage buffer.
///
/// Every upload allocates a fresh buffer; the previous one is dropped with the
/// value it belonged to.
pub struct ColorTableBuffer {
    pub buffer: wgpu::Buffer,
    palette: Palette,
    budget: IterationBudget,
}

/// Bytes per color table entry (RGBA f32).
const COLOR_ENTRY_SIZE: u64 = 16;

/// Largest color table the device can bind as one storage buffer.
pub fn max_color_entries(device: &wgpu::Device) -> u32 {
    let limits = device.limits();
    let bytes = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
    u32::try_from(bytes / COLOR_ENTRY_SIZE).unwrap_or(u32::MAX)
}

/// Fails with [`PipelineError::Buffer`] when a table of `budget` entries
/// would exceed `max_entries`.
pub fn check_color_budget(budget: IterationBudget, max_entries: u32) -> Result<(), PipelineError> {
    if budget.get() > max_entries {
        return Err(PipelineError::Buffer(format!(
            "color table of {} entries exceeds the device limit of {max_entries}",
            budget.get()
        )));
    }
    Ok(())
}

impl ColorTableBuffer {
    /// Upload `table` and block until the copy has completed.
    pub fn upload(session: &GpuSession, table: &ColorTable) -> Result<Self, PipelineError> {
        let (buffer, error) = session.capture_errors(|device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("color_table"),
                contents: table.as_bytes(),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            })
        });
        if let Some(e) = error {
            return Err(PipelineError::Buffer(format!("color table: {e}")));
        }

        session.queue.submit(std::iter::empty());
        session.wait_idle();

        log::debug!(
            "Uploaded {} color table with {} entries",
            table.palette().name(),
            table.len()
        );

        Ok(Self {
            buffer,
            palette: table.palette(),
            budget: table.budget(),
        })
    }

    /// Number of RGBA entries, equal to the budget the table was built for.
    pub fn len(&self) -> u32 {
        self.budget.get()
    }

    pub fn is_current(&self, palette: Palette, budget: IterationBudget) -> bool {
        self.palette == palette && self.budget == budget
    }
}

/// Per-frame argument buffers.
pub struct FrameArgs {
    pub width: wgpu::Buffer,
    pub height: wgpu::Buffer,
    pub view: wgpu::Buffer,
    pub max_iterations: wgpu::Buffer,
}

impl FrameArgs {
    /// Allocate fresh argument buffers for one dispatch.
    pub fn new(
        session: &GpuSession,
        (width, height): (u32, u32),
        view: &DeviceView,
        precision: Precision,
        max_iterations: u32,
    ) -> Result<Self, PipelineError> {
        let (args, error) = session.capture_errors(|device| {
            let uniform = |label: &str, value: u32| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::bytes_of(&value),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            };

            Self {
                width: uniform("kernel_width", width),
                height: uniform("kernel_height", height),
                view: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("kernel_view"),
                    contents: view.as_bytes(precision),
                    usage: wgpu::BufferUsages::STORAGE,
                }),
                max_iterations: uniform("kernel_max_iterations", max_iterations),
            }
        });

        match error {
            Some(e) => Err(PipelineError::Buffer(e.to_string())),
            None => Ok(args),
        }
    }

    /// Bind group in kernel argument order.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        target: &wgpu::TextureView,
        colors: &ColorTableBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kernel_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TARGET_BINDING,
                    resource: wgpu::BindingResource::TextureView(target),
                },
                wgpu::BindGroupEntry {
                    binding: WIDTH_BINDING,
                    resource: self.width.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: HEIGHT_BINDING,
                    resource: self.height.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: VIEW_BINDING,
                    resource: self.view.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: ITERATIONS_BINDING,
                    resource: self.max_iterations.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: COLORS_BINDING,
                    resource: colors.buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Size in bytes of the uploaded view buffer.
    pub fn view_size(&self) -> u64 {
        self.view.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_budget_is_bounded_by_entry_limit() {
        let budget = IterationBudget::new(1_000).unwrap();
        assert!(check_color_budget(budget, 1_000).is_ok());

        let err = check_color_budget(budget, 999).unwrap_err();
        assert!(matches!(err, PipelineError::Buffer(_)));
        assert!(!err.is_fatal());

        let huge = IterationBudget::new(u32::MAX).unwrap();
        assert!(check_color_budget(huge, 128 << 20).is_err());
    }
}
