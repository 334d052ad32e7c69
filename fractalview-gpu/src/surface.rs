//! Texture shared between the compute kernel and the presenter.
//!
//! One `wgpu::Texture` is viewed two ways: a write-only storage view bound by
//! the kernel, and a sampled view drawn by the presenter. The two sides never
//! touch it at the same time. [`Ownership`] records which side holds it, and
//! the only way to move it to the compute side is [`InteropSurface::acquire`],
//! which returns a guard that hands it back on release or drop.

use crate::device::{GpuSession, SURFACE_FORMAT};
use crate::error::PipelineError;
use fractalview_core::Supersampling;

/// Which side currently owns the shared texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    RenderingOwned,
    ComputeOwned,
}

pub struct InteropSurface {
    // Fields drop in declaration order: the compute-side wrapper is released
    // before the texture it wraps.
    storage_view: wgpu::TextureView,
    sampled_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    texture: wgpu::Texture,
    width: u32,
    height: u32,
    base_size: (u32, u32),
    supersampling: Supersampling,
    ownership: Ownership,
}

impl InteropSurface {
    /// Allocate a surface of `base × 2^s` texels per axis.
    pub fn create(
        session: &GpuSession,
        base_width: u32,
        base_height: u32,
        supersampling: Supersampling,
    ) -> Result<Self, PipelineError> {
        let (width, height) = supersampling.scale(base_width, base_height);

        if width == 0 || height == 0 {
            return Err(PipelineError::Allocation(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }

        let max = session.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(PipelineError::Allocation(format!(
                "{width}x{height} exceeds the device texture limit of {max}"
            )));
        }

        let (texture, error) = session.capture_errors(|device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("interop_surface"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: SURFACE_FORMAT,
                usage: wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        });
        if let Some(e) = error {
            return Err(PipelineError::Allocation(e.to_string()));
        }

        let storage_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("interop_surface_storage"),
            ..Default::default()
        });
        let sampled_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("interop_surface_sampled"),
            ..Default::default()
        });
        let sampler = session.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("interop_surface_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "Created {width}x{height} interop surface ({}x of {base_width}x{base_height})",
            supersampling.factor()
        );

        Ok(Self {
            storage_view,
            sampled_view,
            sampler,
            texture,
            width,
            height,
            base_size: (base_width, base_height),
            supersampling,
            ownership: Ownership::RenderingOwned,
        })
    }

    /// Texel dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Displayed size the surface was created for.
    pub fn base_size(&self) -> (u32, u32) {
        self.base_size
    }

    pub fn supersampling(&self) -> Supersampling {
        self.supersampling
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Rendering-side view, valid to sample while rendering-owned.
    pub fn sampled_view(&self) -> &wgpu::TextureView {
        &self.sampled_view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Fails unless the rendering side owns the surface.
    pub fn ensure_rendering_owned(&self) -> Result<(), PipelineError> {
        match self.ownership {
            Ownership::RenderingOwned => Ok(()),
            Ownership::ComputeOwned => Err(PipelineError::Acquire(
                "surface is still owned by compute".to_string(),
            )),
        }
    }

    /// Move the surface to the compute side.
    ///
    /// Pending device work must have completed before this is called. The
    /// returned guard exposes the storage view and returns the surface to the
    /// rendering side on [`ComputeAccess::release`] or when dropped.
    pub fn acquire<'a>(
        &'a mut self,
        session: &'a GpuSession,
    ) -> Result<ComputeAccess<'a>, PipelineError> {
        if self.ownership == Ownership::ComputeOwned {
            return Err(PipelineError::Acquire(
                "surface is already owned by compute".to_string(),
            ));
        }

        self.ownership = Ownership::ComputeOwned;
        session.device.push_error_scope(wgpu::ErrorFilter::Validation);

        Ok(ComputeAccess {
            surface: self,
            session,
            released: false,
        })
    }
}

/// Compute-side ownership of an [`InteropSurface`].
pub struct ComputeAccess<'a> {
    surface: &'a mut InteropSurface,
    session: &'a GpuSession,
    released: bool,
}

impl ComputeAccess<'_> {
    /// Write-only view bound as the kernel's target.
    pub fn storage_view(&self) -> &wgpu::TextureView {
        &self.surface.storage_view
    }

    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    /// Hand the surface back to rendering.
    ///
    /// The caller must already have waited for the compute work. Device
    /// errors raised while compute owned the surface and not claimed by a
    /// narrower scope are reported here.
    pub fn release(mut self) -> Result<(), PipelineError> {
        self.released = true;
        self.surface.ownership = Ownership::RenderingOwned;

        match pollster::block_on(self.session.device.pop_error_scope()) {
            Some(e) => Err(PipelineError::Release(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for ComputeAccess<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        // Error path: never hand the texture back while compute may still run.
        self.session.wait_idle();
        self.surface.ownership = Ownership::RenderingOwned;
        if let Some(e) = pollster::block_on(self.session.device.pop_error_scope()) {
            log::warn!("Device error while surface was compute-owned: {e}");
        }
        log::warn!("Interop surface returned to rendering on an error path");
    }
}
