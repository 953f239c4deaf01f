use std::time::Duration;

use anyhow::Context;

use crate::device::Gpu;
use crate::error::{AnalyzerError, Result};

/// How a pass treats the depth/stencil attachment on entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthStencilLoad {
    /// Clear depth to 1.0 and stencil to 0.
    Clear,
    /// Keep whatever earlier passes left.
    Keep,
}

/// Off-screen color + depth/stencil target all measurements render into.
///
/// Color is never read by the counting logic; it only holds the debug image.
pub struct RenderSurface {
    width: u32,
    height: u32,

    color: wgpu::Texture,
    color_view: wgpu::TextureView,

    depth_stencil: wgpu::Texture,
    depth_stencil_view: wgpu::TextureView,

    destroyed: bool,
}

impl RenderSurface {
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

    /// Allocates the color and depth/stencil attachments.
    ///
    /// Fails with [`AnalyzerError::Initialization`] for a zero size, a size
    /// beyond the device's texture limit, or formats the adapter cannot
    /// render to.
    pub fn create(gpu: &Gpu, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalyzerError::init(format!(
                "render surface size must be non-zero, got {width}x{height}"
            )));
        }
        let max = gpu.device().limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(AnalyzerError::init(format!(
                "render surface {width}x{height} exceeds device limit {max}"
            )));
        }
        for format in [Self::COLOR_FORMAT, Self::DEPTH_STENCIL_FORMAT] {
            if !gpu.supports_render_attachment(format) {
                return Err(AnalyzerError::init(format!(
                    "{format:?} is not renderable on this adapter"
                )));
            }
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("pathprobe color target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth_stencil = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("pathprobe depth/stencil target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_stencil_view = depth_stencil.create_view(&wgpu::TextureViewDescriptor::default());

        log::info!("render surface created ({width}x{height})");

        Ok(Self {
            width,
            height,
            color,
            color_view,
            depth_stencil,
            depth_stencil_view,
            destroyed: false,
        })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Clears color to opaque white, depth to 1.0, and stencil to 0.
    pub fn reset(&self, gpu: &Gpu) {
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathprobe reset encoder"),
            });
        {
            let _pass = self.pass(
                &mut encoder,
                wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                DepthStencilLoad::Clear,
                None,
            );
        }
        gpu.submit(encoder);
    }

    /// Starts a pass that keeps the color image and treats depth/stencil
    /// according to `load`. Occlusion queries of the pass go to `queries`.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        load: DepthStencilLoad,
        queries: Option<&wgpu::QuerySet>,
    ) -> wgpu::RenderPass<'e> {
        self.pass(encoder, wgpu::LoadOp::Load, load, queries)
    }

    fn pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        color_load: wgpu::LoadOp<wgpu::Color>,
        load: DepthStencilLoad,
        queries: Option<&wgpu::QuerySet>,
    ) -> wgpu::RenderPass<'e> {
        let (depth_load, stencil_load) = match load {
            DepthStencilLoad::Clear => (wgpu::LoadOp::Clear(1.0), wgpu::LoadOp::Clear(0)),
            DepthStencilLoad::Keep => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pathprobe pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_stencil_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: queries,
            multiview_mask: None,
        })
    }

    /// Copies the color image to the CPU as tightly packed RGBA8 rows,
    /// top row first.
    pub fn read_color(&self, gpu: &Gpu, timeout: Duration) -> anyhow::Result<Vec<u8>> {
        let row_bytes = self.width * 4;
        let padded_row = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let size = u64::from(padded_row) * u64::from(self.height);

        let buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathprobe color readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathprobe color readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        let submission = gpu.submit(encoder);

        let padded = gpu
            .map_read(&buffer, size, submission, timeout)
            .context("reading back color target")?;
        buffer.destroy();

        Ok(padded
            .chunks_exact(padded_row as usize)
            .flat_map(|row| &row[..row_bytes as usize])
            .copied()
            .collect())
    }

    /// Releases the GPU textures now instead of at drop.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.destroyed {
            return;
        }
        self.color.destroy();
        self.depth_stencil.destroy();
        self.destroyed = true;
        log::debug!("render surface released");
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.release();
    }
}
