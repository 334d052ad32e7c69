//! One frame of compute: bind, launch, wait.

use crate::buffers::{ColorTableBuffer, FrameArgs};
use crate::device::GpuSession;
use crate::error::PipelineError;
use crate::program::KernelProgram;
use crate::surface::InteropSurface;
use fractalview_core::{DeviceView, IterationBudget, LaunchGeometry};
use std::time::{Duration, Instant};

/// Runs a kernel over every texel of an [`InteropSurface`].
pub struct ComputeDispatcher;

impl ComputeDispatcher {
    /// Compute one frame into `surface` and return the elapsed time.
    ///
    /// The surface is back in rendering ownership when this returns, on both
    /// the success and the error path.
    pub fn run_frame(
        session: &GpuSession,
        program: &KernelProgram,
        surface: Option<&mut InteropSurface>,
        colors: Option<&ColorTableBuffer>,
        view: &DeviceView,
        budget: IterationBudget,
    ) -> Result<Duration, PipelineError> {
        let surface = surface.ok_or(PipelineError::NotBound("Texture buffer"))?;
        let colors = colors.ok_or(PipelineError::NotBound("Color buffer"))?;

        let start = Instant::now();
        let size = surface.size();

        let args = FrameArgs::new(session, size, view, program.precision(), budget.get())?;

        // Rendering may still be sampling the texture.
        session.wait_idle();

        let access = surface.acquire(session)?;
        let bind_group = args.bind_group(
            &session.device,
            &program.bind_group_layout,
            access.storage_view(),
            colors,
        );

        let geometry = LaunchGeometry::for_surface(size.0, size.1);
        let (workgroups_x, workgroups_y) = geometry.workgroups();
        log::debug!(
            "Dispatch {}: {}x{} surface, global {:?}, local {:?}",
            program.entry_point(),
            size.0,
            size.1,
            geometry.global,
            geometry.local
        );

        let (submission, error) = session.capture_errors(|device| {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kernel_encoder"),
            });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("kernel_pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
            }
            session.queue.submit(std::iter::once(encoder.finish()))
        });
        if let Some(e) = error {
            // Dropping the guard waits for the device and hands the surface back.
            return Err(PipelineError::Dispatch(e.to_string()));
        }

        session
            .device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));

        access.release()?;
        session.wait_idle();

        let elapsed = start.elapsed();
        log::debug!("Frame computed in {:.2}ms", elapsed.as_secs_f64() * 1000.0);
        Ok(elapsed)
    }
}
