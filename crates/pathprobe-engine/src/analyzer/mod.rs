//! Lane assignment: drives a [`ProbeBackend`] across regions x probes and turns
//! pixel counts into per-obstacle overlap ratios.

mod aggregator;
mod backend;
mod result;

pub use aggregator::ObjectInPathAnalyzer;
pub use backend::{ProbeBackend, ProbeScene};
pub use result::{intersection_ratio, Assignment, LaneAssignmentResult, PixelCount};
