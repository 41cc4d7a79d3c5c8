use std::sync::mpsc;

use anyhow::{Context, Result};

/// One 8-bit RGBA pixel as read back from a colour target.
pub type Rgba8 = [u8; 4];

/// Colour texture rendered to without a window.
///
/// Created with `COPY_SRC` so the contents can be read back after a frame.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "offscreen target has zero size");
        anyhow::ensure!(
            is_rgba8_like(format),
            "offscreen readback does not support {format:?}"
        );

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            format,
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.texture.size();
        (size.width, size.height)
    }

    /// Copies the texture into host memory, row-major from the top-left pixel.
    ///
    /// BGRA targets are swizzled so every pixel comes back as `[r, g, b, a]`.
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_pixels(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<Rgba8>> {
        let (width, height) = self.size();
        let packed_row = width * 4;
        let padded_row = padded_bytes_per_row(packed_row);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism offscreen readback"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("prism readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            self.texture.size(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = mpsc::channel();
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = sender.send(res);
        });

        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during readback")?;

        receiver
            .recv()
            .context("readback callback was dropped")?
            .context("failed to map readback buffer")?;

        let swizzle = matches!(
            self.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );

        let mut pixels = Vec::with_capacity((width * height) as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks_exact(padded_row as usize) {
                for px in row[..packed_row as usize].chunks_exact(4) {
                    pixels.push(if swizzle {
                        [px[2], px[1], px[0], px[3]]
                    } else {
                        [px[0], px[1], px[2], px[3]]
                    });
                }
            }
        }
        staging.unmap();

        Ok(pixels)
    }
}

fn is_rgba8_like(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Rgba8Unorm
            | wgpu::TextureFormat::Rgba8UnormSrgb
            | wgpu::TextureFormat::Bgra8Unorm
            | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

/// Rounds a packed row size up to wgpu's copy alignment (256 bytes).
fn padded_bytes_per_row(packed: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    packed.div_ceil(align) * align
}
