//! Rasterized object-in-path lane assignment.
//!
//! Obstacles and lanes are rendered as flat top-down footprints into an
//! off-screen surface. Each lane is stamped into the stencil buffer, each
//! obstacle is drawn against it, and occlusion queries count the surviving
//! pixels. Pixel counts stand in for polygon intersection areas.
//!
//! ```no_run
//! use pathprobe_engine::prelude::*;
//!
//! # fn main() -> pathprobe_engine::error::Result<()> {
//! let config = AnalyzerConfig::default();
//! let gpu = Gpu::new_blocking(GpuInit::default())?;
//! let program = ProbeProgram::bundled(gpu.device());
//! let backend = GpuProbeBackend::new(gpu, &program, &config)?;
//! let mut analyzer = ObjectInPathAnalyzer::new(backend, config);
//!
//! let lanes = [Lane::straight(0, -10.0, 100.0, -1.0, 1.0)];
//! let obstacles = [Obstacle::axis_aligned(7, Vec2::new(20.0, -0.5), Vec2::new(25.0, 0.5))];
//! for result in analyzer.assign_lanes(&lanes, &obstacles)? {
//!     println!("{}: {:?}", result.obstacle_id, result.primary());
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod coords;
pub mod device;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod software;

/// Types needed for a typical analyzer setup.
pub mod prelude {
    pub use crate::analyzer::{LaneAssignmentResult, ObjectInPathAnalyzer, PixelCount};
    pub use crate::config::{AnalyzerConfig, ReadbackMode};
    pub use crate::coords::{Point3, Vec2, ViewWindow};
    pub use crate::device::{Gpu, GpuInit};
    pub use crate::geometry::{Freespace, FreespaceRay, Lane, Obstacle};
    pub use crate::render::{GpuProbeBackend, ProbeProgram};
    pub use crate::software::SoftwareProbeBackend;
}
