//! GPU compute-to-display pipeline for escape-time fractals using wgpu.

mod buffers;
mod device;
mod dispatcher;
mod error;
mod present;
mod program;
mod readback;
mod renderer;
mod surface;
#[cfg(test)]
mod tests;

pub use buffers::{kernel_bind_group_layout, ColorTableBuffer, FrameArgs};
pub use device::{
    select_device, DeviceCapabilities, GpuSession, SessionAvailability, SessionOptions,
    BACKEND_ORDER, SURFACE_FORMAT,
};
pub use dispatcher::ComputeDispatcher;
pub use error::PipelineError;
pub use present::Presenter;
pub use program::{declares_function, KernelProgram, KernelSource, MANDELBROT_KERNEL};
pub use readback::{padded_row_bytes, read_surface_pixels};
pub use renderer::FractalRenderer;
pub use surface::{ComputeAccess, InteropSurface, Ownership};
