//! GPU tests. Each one returns early when the machine has no usable adapter
//! or the adapter's occlusion queries fail calibration.

use super::*;
use crate::analyzer::{ObjectInPathAnalyzer, PixelCount, ProbeBackend, ProbeScene};
use crate::config::{AnalyzerConfig, ReadbackMode};
use crate::coords::Vec2;
use crate::device::{Gpu, GpuInit};
use crate::error::AnalyzerError;
use crate::geometry::{triangulate_obstacle, Lane, Obstacle};
use crate::software::SoftwareProbeBackend;

fn gpu() -> Option<Gpu> {
    match Gpu::new_blocking(GpuInit::default()) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
    }
}

fn backend(config: &AnalyzerConfig) -> Option<GpuProbeBackend> {
    let gpu = gpu()?;
    let program = ProbeProgram::bundled(gpu.device());
    match GpuProbeBackend::new(gpu, &program, config) {
        Ok(backend) => Some(backend),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

fn three_lanes() -> Vec<Lane> {
    vec![
        Lane::straight(0, -10.0, 100.0, 1.0, 3.0),
        Lane::straight(1, -10.0, 100.0, -1.0, 1.0),
        Lane::straight(2, -10.0, 100.0, -3.0, -1.0),
    ]
}

fn boxed(id: i64, x0: f32, y0: f32, x1: f32, y1: f32) -> Obstacle {
    Obstacle::axis_aligned(id, Vec2::new(x0, y0), Vec2::new(x1, y1))
}

fn scenario_obstacles() -> Vec<Obstacle> {
    vec![
        boxed(100, 20.0, -0.75, 25.0, 0.75),
        boxed(101, 20.0, 2.0, 25.0, 4.0),
        boxed(102, 10.0, 4.0, 15.0, 5.5),
    ]
}

// ── surface ───────────────────────────────────────────────────────────────

#[test]
fn zero_sized_surface_is_rejected() {
    let Some(gpu) = gpu() else { return };
    let err = RenderSurface::create(&gpu, 0, 600).err();
    assert!(matches!(err, Some(AnalyzerError::Initialization(_))));
}

#[test]
fn oversized_surface_is_rejected() {
    let Some(gpu) = gpu() else { return };
    let max = gpu.device().limits().max_texture_dimension_2d;
    let err = RenderSurface::create(&gpu, max + 1, 16).err();
    assert!(matches!(err, Some(AnalyzerError::Initialization(_))));
}

#[test]
fn reset_paints_the_debug_image_white() {
    let config = AnalyzerConfig {
        width: 64,
        height: 32,
        ..AnalyzerConfig::default()
    };
    let Some(mut backend) = backend(&config) else { return };
    backend.reset();

    let pixels = backend.read_color().unwrap();
    assert_eq!(pixels.len(), 64 * 32 * 4);
    assert!(pixels.iter().all(|&b| b == 255));
    backend.destroy();
}

// ── counter ───────────────────────────────────────────────────────────────

#[test]
fn count_pixels_wraps_a_single_draw() {
    let config = AnalyzerConfig::default();
    let Some(gpu) = gpu() else { return };
    let program = ProbeProgram::bundled(gpu.device());
    let Ok(surface) = RenderSurface::create(&gpu, config.width, config.height) else { return };
    let ctx = RenderCtx::new(
        gpu.device(),
        gpu.queue(),
        RenderSurface::COLOR_FORMAT,
        RenderSurface::DEPTH_STENCIL_FORMAT,
        config.view,
    );
    let mut renderer = MaskedRenderer::new(&ctx, &program);
    let scene = ProbeScene::new(
        Vec::new(),
        vec![triangulate_obstacle(&boxed(1, 20.0, -0.75, 25.0, 0.75))],
        &config,
    );
    let ranges = renderer.upload(&ctx, &scene);
    surface.reset(&gpu);

    let mut counter = OcclusionCounter::new(config.query_timeout);
    let probe = &ranges.probes[0];
    let first = counter.count_pixels(&gpu, &surface, |pass| renderer.draw_unmasked(pass, probe));
    let second = counter.count_pixels(&gpu, &surface, |pass| renderer.draw_unmasked(pass, probe));
    assert_eq!(first, second);

    // Nothing is stamped, so a masked draw finds no stencil to pass.
    let masked = counter.count_pixels(&gpu, &surface, |pass| renderer.draw_probe(pass, probe));
    if first.is_available() {
        assert!(first.pixels() > 0);
        assert_eq!(masked, PixelCount::Counted(0));
    }
}

// ── analyzer ──────────────────────────────────────────────────────────────

#[test]
fn three_lane_scenario_on_gpu() {
    let config = AnalyzerConfig::default();
    let Some(backend) = backend(&config) else { return };
    let mut a = ObjectInPathAnalyzer::new(backend, config);

    let results = a.assign_lanes(&three_lanes(), &scenario_obstacles()).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| !r.degraded));

    assert_eq!(results[0].lane_ids().collect::<Vec<_>>(), vec![1]);
    let ratio = results[0].assignments[0].ratio.unwrap();
    assert!((ratio - 1.0).abs() < 1e-6, "ratio {ratio}");

    assert_eq!(results[1].lane_ids().collect::<Vec<_>>(), vec![0]);
    let ratio = results[1].assignments[0].ratio.unwrap();
    assert!(ratio > 0.0 && ratio < 1.0, "ratio {ratio}");

    assert!(results[2].is_unassigned());
    assert!(results[2].total_pixel_area > 0);
}

#[test]
fn gpu_counts_track_the_software_reference() {
    let config = AnalyzerConfig::default();
    let Some(gpu_backend) = backend(&config) else { return };
    let mut on_gpu = ObjectInPathAnalyzer::new(gpu_backend, config.clone());
    let cpu_backend = SoftwareProbeBackend::new(&config).unwrap();
    let mut on_cpu = ObjectInPathAnalyzer::new(cpu_backend, config);

    let lanes = three_lanes();
    let obstacles = scenario_obstacles();
    let gpu_results = on_gpu.assign_lanes(&lanes, &obstacles).unwrap().to_vec();
    let cpu_results = on_cpu.assign_lanes(&lanes, &obstacles).unwrap();

    for (g, c) in gpu_results.iter().zip(cpu_results) {
        assert_eq!(g.obstacle_id, c.obstacle_id);
        assert_eq!(g.lane_ids().collect::<Vec<_>>(), c.lane_ids().collect::<Vec<_>>());
        let diff = g.total_pixel_area.abs_diff(c.total_pixel_area);
        assert!(
            diff <= c.total_pixel_area / 50,
            "{} vs {}",
            g.total_pixel_area,
            c.total_pixel_area
        );
    }
}

#[test]
fn readback_modes_agree() {
    let per_region = AnalyzerConfig::default();
    let per_probe = AnalyzerConfig {
        readback: ReadbackMode::PerProbe,
        ..AnalyzerConfig::default()
    };
    let Some(a_backend) = backend(&per_region) else { return };
    let Some(b_backend) = backend(&per_probe) else { return };
    let mut a = ObjectInPathAnalyzer::new(a_backend, per_region);
    let mut b = ObjectInPathAnalyzer::new(b_backend, per_probe);

    let lanes = three_lanes();
    let obstacles = scenario_obstacles();
    let batched = a.assign_lanes(&lanes, &obstacles).unwrap().to_vec();
    let stalled = b.assign_lanes(&lanes, &obstacles).unwrap();
    assert_eq!(batched.as_slice(), stalled);
}

#[test]
fn probe_sets_beyond_one_query_set_keep_the_mask() {
    let config = AnalyzerConfig::default();
    let Some(backend) = backend(&config) else { return };
    let mut a = ObjectInPathAnalyzer::new(backend, config);

    // The last obstacle lands in the second batch; it must still be masked.
    let mut obstacles: Vec<Obstacle> = (0..MAX_QUERIES as i64)
        .map(|i| boxed(i, 40.0, 10.0, 41.0, 11.0))
        .collect();
    obstacles.push(boxed(-1, 20.0, -0.75, 25.0, 0.75));

    let results = a.assign_lanes(&three_lanes(), &obstacles).unwrap();
    assert_eq!(results.len(), MAX_QUERIES + 1);
    assert!(results[..MAX_QUERIES].iter().all(|r| r.is_unassigned()));
    assert_eq!(results[MAX_QUERIES].lane_ids().collect::<Vec<_>>(), vec![1]);
}
