//! CPU reference backend.
//!
//! Follows the GPU path step for step (clear, stamp, stencil-equal probe,
//! fragment counting) with the same fill rule, so it is usable wherever no
//! adapter is available and as a deterministic baseline in tests.

mod raster;
mod surface;

pub use surface::SoftwareSurface;

use crate::analyzer::{PixelCount, ProbeBackend, ProbeScene};
use crate::config::AnalyzerConfig;

/// [`ProbeBackend`] backed by a [`SoftwareSurface`].
pub struct SoftwareProbeBackend {
    surface: SoftwareSurface,
}

impl SoftwareProbeBackend {
    pub fn new(config: &AnalyzerConfig) -> crate::error::Result<Self> {
        config.validate()?;
        log::info!("software surface created ({}x{})", config.width, config.height);
        Ok(Self {
            surface: SoftwareSurface::new(config.width, config.height, config.view),
        })
    }

    pub fn surface(&self) -> &SoftwareSurface {
        &self.surface
    }
}

impl ProbeBackend for SoftwareProbeBackend {
    fn reset(&mut self) {
        self.surface.reset();
    }

    fn measure_unmasked(&mut self, scene: &ProbeScene) -> Vec<PixelCount> {
        let color = scene.probe_color;
        scene
            .probes
            .iter()
            .map(|probe| self.surface.count_pixels(|s| s.draw_unmasked(probe, color)))
            .collect()
    }

    fn measure_masked(&mut self, scene: &ProbeScene, region: usize) -> Vec<PixelCount> {
        let Some(mesh) = scene.regions.get(region) else {
            return vec![PixelCount::Unavailable; scene.probes.len()];
        };
        let region_color = scene.region_colors.get(region).copied().unwrap_or_default();
        self.surface.begin_mask(mesh, region_color);

        let color = scene.probe_color;
        scene
            .probes
            .iter()
            .map(|probe| self.surface.count_pixels(|s| s.draw_probe(probe, color)))
            .collect()
    }
}
