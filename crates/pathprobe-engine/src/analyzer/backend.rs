use crate::config::AnalyzerConfig;
use crate::coords::{lane_color, ColorRgba};
use crate::geometry::TriangleMesh;

use super::PixelCount;

/// Geometry and colors for one top-level call.
///
/// Regions are mask shapes (lanes, freespace); probes are measured shapes
/// (obstacles, ego footprint). Indices are input order.
#[derive(Debug, Clone, Default)]
pub struct ProbeScene {
    pub regions: Vec<TriangleMesh>,
    pub region_colors: Vec<ColorRgba>,
    pub probes: Vec<TriangleMesh>,
    pub probe_color: ColorRgba,
}

impl ProbeScene {
    /// Pairs each region with its palette color, picked by the region's
    /// position within this call.
    pub fn new(regions: Vec<TriangleMesh>, probes: Vec<TriangleMesh>, config: &AnalyzerConfig) -> Self {
        let region_colors = (0..regions.len())
            .map(|i| lane_color(i, config.mask_alpha))
            .collect();
        Self {
            regions,
            region_colors,
            probes,
            probe_color: config.probe_color,
        }
    }

    /// Total vertex count across every mesh.
    pub fn vertex_count(&self) -> usize {
        self.regions
            .iter()
            .chain(self.probes.iter())
            .map(TriangleMesh::vertex_count)
            .sum()
    }
}

/// A device that can stamp stencil masks and count rasterized probe pixels.
///
/// Calls arrive in a fixed order per top-level call:
/// `prepare`, `reset`, `measure_unmasked`, then `measure_masked` once per
/// region. Implementations own all mutable surface state, so callers must not
/// interleave two sequences on one backend.
pub trait ProbeBackend {
    /// Makes `scene` geometry available to later measurements.
    fn prepare(&mut self, scene: &ProbeScene) {
        let _ = scene;
    }

    /// Clears color to opaque white, depth to 1.0, and stencil to 0.
    fn reset(&mut self);

    /// Counts each probe's footprint with the stencil test bypassed.
    ///
    /// Returns one count per probe, in probe order.
    fn measure_unmasked(&mut self, scene: &ProbeScene) -> Vec<PixelCount>;

    /// Stamps `scene.regions[region]` into a freshly cleared stencil buffer
    /// and counts each probe's pixels inside it.
    ///
    /// Returns one count per probe, in probe order.
    fn measure_masked(&mut self, scene: &ProbeScene, region: usize) -> Vec<PixelCount>;
}

impl<B: ProbeBackend + ?Sized> ProbeBackend for &mut B {
    fn prepare(&mut self, scene: &ProbeScene) {
        (**self).prepare(scene)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn measure_unmasked(&mut self, scene: &ProbeScene) -> Vec<PixelCount> {
        (**self).measure_unmasked(scene)
    }

    fn measure_masked(&mut self, scene: &ProbeScene, region: usize) -> Vec<PixelCount> {
        (**self).measure_masked(scene, region)
    }
}
