//! Copying a rendered surface back to host memory.

use crate::device::GpuSession;
use crate::error::PipelineError;
use crate::surface::InteropSurface;

const BYTES_PER_TEXEL: u32 = 4;

/// Row pitch of the staging buffer, padded to the copy alignment.
pub fn padded_row_bytes(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_TEXEL;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Tightly packed RGBA8 texels of `surface`, row-major from the top.
pub fn read_surface_pixels(
    session: &GpuSession,
    surface: &InteropSurface,
) -> Result<Vec<u8>, PipelineError> {
    surface.ensure_rendering_owned()?;

    let (width, height) = surface.size();
    let row_bytes = (width * BYTES_PER_TEXEL) as usize;
    let padded = padded_row_bytes(width);

    let staging = session.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("surface_readback"),
        size: padded as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = session
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("surface_readback_encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: surface.texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    session.queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = futures_channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    session.wait_idle();

    pollster::block_on(rx)
        .map_err(|_| PipelineError::Buffer("readback channel closed".into()))?
        .map_err(|e| PipelineError::Buffer(format!("readback map failed: {e}")))?;

    let pixels = {
        let mapped = slice.get_mapped_range();
        mapped
            .chunks_exact(padded as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };
    staging.unmap();

    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
        assert_eq!(padded_row_bytes(800), 3328);
        assert_eq!(padded_row_bytes(1), 256);
    }
}
