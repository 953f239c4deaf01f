use crate::analyzer::{PixelCount, ProbeBackend, ProbeScene};
use crate::config::{AnalyzerConfig, ReadbackMode};
use crate::coords::Point3;
use crate::device::Gpu;
use crate::error::{AnalyzerError, Result};
use crate::geometry::TriangleMesh;

use super::masked::{DrawRange, MaskedRenderer, SceneRanges};
use super::occlusion::{OcclusionCounter, MAX_QUERIES};
use super::surface::{DepthStencilLoad, RenderSurface};
use super::{ProbeProgram, RenderCtx};

/// [`ProbeBackend`] that renders on the GPU and counts with occlusion
/// queries.
pub struct GpuProbeBackend {
    gpu: Gpu,
    surface: RenderSurface,
    renderer: MaskedRenderer,
    counter: OcclusionCounter,
    ranges: SceneRanges,
    config: AnalyzerConfig,
}

impl GpuProbeBackend {
    /// Creates the render surface and pipelines, then calibrates the counter.
    ///
    /// Calibration draws a quad covering the whole view and requires exactly
    /// one sample per pixel back. Backends whose occlusion queries only
    /// report visibility fail here with [`AnalyzerError::Initialization`].
    pub fn new(gpu: Gpu, program: &ProbeProgram, config: &AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let surface = RenderSurface::create(&gpu, config.width, config.height)?;
        let renderer = MaskedRenderer::new(
            &RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                RenderSurface::COLOR_FORMAT,
                RenderSurface::DEPTH_STENCIL_FORMAT,
                config.view,
            ),
            program,
        );

        let mut backend = Self {
            gpu,
            surface,
            renderer,
            counter: OcclusionCounter::new(config.query_timeout),
            ranges: SceneRanges::default(),
            config: config.clone(),
        };
        backend.calibrate()?;
        Ok(backend)
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    /// Debug image of the last measurements, tightly packed RGBA8, top row
    /// first.
    pub fn read_color(&self) -> anyhow::Result<Vec<u8>> {
        self.surface.read_color(&self.gpu, self.counter.timeout())
    }

    /// Releases the surface attachments now.
    pub fn destroy(self) {
        self.surface.destroy();
    }

    fn calibrate(&mut self) -> Result<()> {
        let v = self.config.view;
        let quad = TriangleMesh::strip(vec![
            Point3::flat(v.min.x, v.min.y),
            Point3::flat(v.min.x, v.max.y),
            Point3::flat(v.max.x, v.min.y),
            Point3::flat(v.max.x, v.max.y),
        ]);
        let scene = ProbeScene::new(Vec::new(), vec![quad], &self.config);
        self.prepare(&scene);
        self.reset();

        let expected = u64::from(self.config.width) * u64::from(self.config.height);
        match self.measure_unmasked(&scene).first() {
            Some(PixelCount::Counted(n)) if *n == expected => {
                log::debug!("occlusion counter calibrated ({expected} samples)");
                Ok(())
            }
            got => Err(AnalyzerError::init(format!(
                "occlusion counter calibration expected {expected} samples, got {got:?}"
            ))),
        }
    }

    fn batch_len(&self) -> usize {
        match self.config.readback {
            ReadbackMode::PerProbe => 1,
            ReadbackMode::PerRegion => MAX_QUERIES,
        }
    }

    /// Counts `probes` in consecutive batches, each read back with one
    /// wait. With a `mask`, the first batch's pass stamps it after clearing
    /// depth and stencil and every probe is drawn masked; later batches keep
    /// the stamped stencil.
    fn count_probes(&mut self, probes: &[DrawRange], mask: Option<&DrawRange>) -> Vec<PixelCount> {
        let batch = self.batch_len();
        let (gpu, surface, renderer) = (&self.gpu, &self.surface, &self.renderer);
        let counter = &mut self.counter;

        let mut counts = Vec::with_capacity(probes.len());
        for (i, chunk) in probes.chunks(batch).enumerate() {
            counts.extend(counter.count_batch(gpu, chunk.len(), |encoder, queries| {
                let mut pass = match mask {
                    Some(region) if i == 0 => {
                        renderer.begin_mask(encoder, surface, region, Some(queries))
                    }
                    _ => surface.begin_pass(encoder, DepthStencilLoad::Keep, Some(queries)),
                };
                for (slot, probe) in chunk.iter().enumerate() {
                    pass.begin_occlusion_query(slot as u32);
                    if mask.is_some() {
                        renderer.draw_probe(&mut pass, probe);
                    } else {
                        renderer.draw_unmasked(&mut pass, probe);
                    }
                    pass.end_occlusion_query();
                }
            }));
        }
        counts
    }

    fn scene_matches(&self, scene: &ProbeScene) -> bool {
        self.ranges.regions.len() == scene.regions.len()
            && self.ranges.probes.len() == scene.probes.len()
    }
}

impl ProbeBackend for GpuProbeBackend {
    fn prepare(&mut self, scene: &ProbeScene) {
        let ctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            RenderSurface::COLOR_FORMAT,
            RenderSurface::DEPTH_STENCIL_FORMAT,
            self.config.view,
        );
        self.ranges = self.renderer.upload(&ctx, scene);
    }

    fn reset(&mut self) {
        self.surface.reset(&self.gpu);
    }

    fn measure_unmasked(&mut self, scene: &ProbeScene) -> Vec<PixelCount> {
        if !self.scene_matches(scene) {
            log::warn!("measure_unmasked called with a scene that was not prepared");
            return vec![PixelCount::Unavailable; scene.probes.len()];
        }
        let probes = std::mem::take(&mut self.ranges.probes);
        let counts = self.count_probes(&probes, None);
        self.ranges.probes = probes;
        counts
    }

    fn measure_masked(&mut self, scene: &ProbeScene, region: usize) -> Vec<PixelCount> {
        if !self.scene_matches(scene) {
            log::warn!("measure_masked called with a scene that was not prepared");
            return vec![PixelCount::Unavailable; scene.probes.len()];
        }
        let Some(mask) = self.ranges.regions.get(region).cloned() else {
            return vec![PixelCount::Unavailable; scene.probes.len()];
        };

        if scene.probes.is_empty() {
            // Nothing to count; stamp the mask so the debug image still shows it.
            let mut encoder = self
                .gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("pathprobe mask encoder"),
                });
            {
                let _pass = self.renderer.begin_mask(&mut encoder, &self.surface, &mask, None);
            }
            self.gpu.submit(encoder);
            return Vec::new();
        }

        let probes = std::mem::take(&mut self.ranges.probes);
        let counts = self.count_probes(&probes, Some(&mask));
        self.ranges.probes = probes;
        counts
    }
}
