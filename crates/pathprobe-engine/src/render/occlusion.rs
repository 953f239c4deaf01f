use std::time::Duration;

use crate::analyzer::PixelCount;
use crate::device::Gpu;

use super::surface::{DepthStencilLoad, RenderSurface};

/// Query slots a single batch may use.
pub const MAX_QUERIES: usize = 4096;

const QUERY_BYTES: u64 = std::mem::size_of::<u64>() as u64;

/// Counts samples that pass every per-fragment test, via occlusion queries.
///
/// The query set and its resolve/readback buffers are grown on demand and
/// reused across batches.
pub struct OcclusionCounter {
    query_set: Option<wgpu::QuerySet>,
    resolve_buf: Option<wgpu::Buffer>,
    readback_buf: Option<wgpu::Buffer>,
    capacity: usize,

    timeout: Duration,
}

impl OcclusionCounter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            query_set: None,
            resolve_buf: None,
            readback_buf: None,
            capacity: 0,
            timeout,
        }
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Counts the samples `draw` produces in a pass that keeps the current
    /// depth and stencil contents.
    pub fn count_pixels(
        &mut self,
        gpu: &Gpu,
        surface: &RenderSurface,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>),
    ) -> PixelCount {
        let counts = self.count_batch(gpu, 1, |encoder, queries| {
            let mut pass = surface.begin_pass(encoder, DepthStencilLoad::Keep, Some(queries));
            pass.begin_occlusion_query(0);
            draw(&mut pass);
            pass.end_occlusion_query();
        });
        counts.first().copied().unwrap_or(PixelCount::Unavailable)
    }

    /// Records `slots` queries through `record`, submits, and reads all of
    /// them back with a single wait.
    ///
    /// `record` must open and close exactly one occlusion query per slot in
    /// `0..slots` on passes that use the provided query set. A failed or
    /// timed-out readback turns every slot of the batch into
    /// [`PixelCount::Unavailable`].
    pub fn count_batch(
        &mut self,
        gpu: &Gpu,
        slots: usize,
        record: impl FnOnce(&mut wgpu::CommandEncoder, &wgpu::QuerySet),
    ) -> Vec<PixelCount> {
        if slots == 0 {
            return Vec::new();
        }
        if slots > MAX_QUERIES {
            log::warn!("batch of {slots} queries exceeds the {MAX_QUERIES} slot limit");
            return vec![PixelCount::Unavailable; slots];
        }
        self.ensure_capacity(gpu, slots);

        let (Some(query_set), Some(resolve_buf), Some(readback_buf)) = (
            self.query_set.as_ref(),
            self.resolve_buf.as_ref(),
            self.readback_buf.as_ref(),
        ) else {
            return vec![PixelCount::Unavailable; slots];
        };

        let bytes = slots as u64 * QUERY_BYTES;
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathprobe occlusion encoder"),
            });
        record(&mut encoder, query_set);
        encoder.resolve_query_set(query_set, 0..slots as u32, resolve_buf, 0);
        encoder.copy_buffer_to_buffer(resolve_buf, 0, readback_buf, 0, bytes);
        let submission = gpu.submit(encoder);

        match gpu.map_read(readback_buf, bytes, submission, self.timeout) {
            Ok(raw) => parse_counts(&raw, slots),
            Err(err) => {
                log::warn!("occlusion readback failed ({slots} queries): {err:#}");
                vec![PixelCount::Unavailable; slots]
            }
        }
    }

    fn ensure_capacity(&mut self, gpu: &Gpu, required: usize) {
        if required <= self.capacity && self.query_set.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().clamp(64, MAX_QUERIES);
        let size = new_cap as u64 * QUERY_BYTES;
        let device = gpu.device();

        self.query_set = Some(device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("pathprobe occlusion queries"),
            ty: wgpu::QueryType::Occlusion,
            count: new_cap as u32,
        }));
        self.resolve_buf = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathprobe occlusion resolve"),
            size,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        }));
        self.readback_buf = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathprobe occlusion readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        log::debug!("occlusion query capacity grown to {new_cap}");
    }
}

/// Decodes resolved occlusion results (native-endian `u64` per slot).
/// Missing trailing slots come back unavailable.
fn parse_counts(raw: &[u8], slots: usize) -> Vec<PixelCount> {
    let mut counts: Vec<PixelCount> = raw
        .chunks_exact(QUERY_BYTES as usize)
        .take(slots)
        .map(|chunk| {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            PixelCount::Counted(u64::from_ne_bytes(b))
        })
        .collect();
    counts.resize(slots, PixelCount::Unavailable);
    counts
}
