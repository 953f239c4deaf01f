use std::time::Instant;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::geometry::{triangulate_obstacle, Footprint, Lane, Obstacle, TriangleMesh};

use super::{LaneAssignmentResult, PixelCount, ProbeBackend, ProbeScene};

/// Labels obstacles with the lanes they overlap.
///
/// Owns its backend for its whole lifetime; the backend's surface is reused
/// as scratch space by every call. Results of the latest call stay available
/// through [`results`](Self::results) until the next call clears them.
pub struct ObjectInPathAnalyzer<B> {
    backend: B,
    config: AnalyzerConfig,
    results: Vec<LaneAssignmentResult>,
}

impl<B: ProbeBackend> ObjectInPathAnalyzer<B> {
    pub fn new(backend: B, config: AnalyzerConfig) -> Self {
        Self {
            backend,
            config,
            results: Vec::new(),
        }
    }

    /// Computes lane assignments for `obstacles` against `lanes`.
    ///
    /// Returns one entry per obstacle, in obstacle order. A malformed lane
    /// aborts the call before anything is rendered and leaves the results
    /// empty; failed measurements only degrade the affected entries.
    pub fn assign_lanes(
        &mut self,
        lanes: &[Lane],
        obstacles: &[Obstacle],
    ) -> Result<&[LaneAssignmentResult]> {
        self.assign(lanes, obstacles)
    }

    /// Same as [`assign_lanes`](Self::assign_lanes) for any region and probe
    /// shapes, e.g. freespace against an ego footprint.
    pub fn assign<R, P>(&mut self, regions: &[R], probes: &[P]) -> Result<&[LaneAssignmentResult]>
    where
        R: Footprint,
        P: Footprint,
    {
        self.results.clear();
        let started = Instant::now();

        let region_meshes = regions
            .iter()
            .map(Footprint::triangulate)
            .collect::<Result<Vec<TriangleMesh>>>()?;
        let probe_meshes = probes
            .iter()
            .map(Footprint::triangulate)
            .collect::<Result<Vec<TriangleMesh>>>()?;

        let scene = ProbeScene::new(region_meshes, probe_meshes, &self.config);
        self.backend.prepare(&scene);
        self.backend.reset();

        let totals = self.backend.measure_unmasked(&scene);
        self.results.extend(
            probes
                .iter()
                .enumerate()
                .map(|(i, p)| LaneAssignmentResult::new(p.footprint_id(), count_at(&totals, i))),
        );

        for (r, region) in regions.iter().enumerate() {
            let counts = self.backend.measure_masked(&scene, r);
            for (i, result) in self.results.iter_mut().enumerate() {
                let count = count_at(&counts, i);
                log::trace!(
                    "region {} x probe {}: {:?}",
                    region.footprint_id(),
                    result.obstacle_id,
                    count
                );
                result.record(region.footprint_id(), count);
            }
        }

        for result in &mut self.results {
            result.finalize_ratios();
        }

        let degraded = self.results.iter().filter(|r| r.degraded).count();
        if degraded > 0 {
            log::warn!("{degraded} of {} result(s) used unavailable pixel counts", self.results.len());
        }
        log::debug!(
            "assigned {} probe(s) against {} region(s) in {:?}",
            probes.len(),
            regions.len(),
            started.elapsed()
        );

        Ok(&self.results)
    }

    /// Measures one obstacle's unmasked footprint on a freshly reset surface.
    pub fn measure_footprint(&mut self, obstacle: &Obstacle) -> PixelCount {
        let scene = ProbeScene::new(Vec::new(), vec![triangulate_obstacle(obstacle)], &self.config);
        self.backend.prepare(&scene);
        self.backend.reset();
        count_at(&self.backend.measure_unmasked(&scene), 0)
    }

    /// Results of the most recent call.
    pub fn results(&self) -> &[LaneAssignmentResult] {
        &self.results
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Tears the analyzer down, returning its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// A backend that returns fewer counts than probes reports the rest as
/// unavailable.
fn count_at(counts: &[PixelCount], i: usize) -> PixelCount {
    counts.get(i).copied().unwrap_or(PixelCount::Unavailable)
}
