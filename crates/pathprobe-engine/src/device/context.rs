use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};

use super::GpuInit;

/// Owns (or adopts) the wgpu device and queue used by the analyzer.
///
/// This is the headless counterpart of a windowed rendering context: there is
/// no surface or swapchain, every draw targets off-screen textures.
pub struct Gpu {
    /// Present when the adapter was acquired here; adopted devices come
    /// without one and skip adapter-level format checks.
    adapter: Option<wgpu::Adapter>,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

impl Gpu {
    /// Acquires an adapter, device, and queue without a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("pathprobe device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self {
            adapter: Some(adapter),
            device,
            queue,
        })
    }

    /// Blocking variant of [`Gpu::new`].
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Adopts a device and queue created by the host application.
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            adapter: None,
            device,
            queue,
        }
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter(&self) -> Option<&wgpu::Adapter> {
        self.adapter.as_ref()
    }

    /// `true` if `format` can be used as a single-sample render attachment.
    ///
    /// Adopted devices have no adapter to ask; the formats used by the
    /// analyzer are renderable on every WebGPU implementation, so this
    /// answers `true` for them.
    pub fn supports_render_attachment(&self, format: wgpu::TextureFormat) -> bool {
        self.adapter.as_ref().is_none_or(|adapter| {
            adapter
                .get_texture_format_features(format)
                .allowed_usages
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        })
    }

    /// Submits `encoder` and returns the submission index.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) -> wgpu::SubmissionIndex {
        self.queue.submit(std::iter::once(encoder.finish()))
    }

    /// Maps the first `size` bytes of `buffer` for reading once `submission`
    /// has completed, waiting at most `timeout`, and copies them out.
    ///
    /// On timeout the pending map is aborted so the buffer can be reused.
    pub fn map_read(
        &self,
        buffer: &wgpu::Buffer,
        size: u64,
        submission: wgpu::SubmissionIndex,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let slice = buffer.slice(..size);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });

        let polled = self.device.poll(wgpu::PollType::Wait {
            submission_index: Some(submission),
            timeout: Some(timeout),
        });

        match rx.try_recv() {
            Ok(Ok(())) => {
                let bytes = slice.get_mapped_range().to_vec();
                buffer.unmap();
                Ok(bytes)
            }
            Ok(Err(err)) => Err(anyhow::Error::new(err).context("buffer mapping failed")),
            Err(_) => {
                // Still pending: abort so the next map_async is legal.
                buffer.unmap();
                match polled {
                    Err(err) => Err(anyhow::Error::new(err).context("waiting for readback")),
                    Ok(_) => anyhow::bail!("readback not ready after {timeout:?}"),
                }
            }
        }
    }
}
