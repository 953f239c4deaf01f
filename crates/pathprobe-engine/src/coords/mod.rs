//! Coordinate and color types shared by triangulation and both probe backends.
//!
//! Canonical CPU space:
//! - World meters on the ground plane
//! - +X forward, +Y left (top-down view)
//!
//! The GPU converts to NDC in the vertex shader using a view uniform; the
//! software rasterizer performs the same conversion on the CPU.

mod color;
mod point;
mod view;

pub use color::{lane_color, ColorRgba, LANE_PALETTE};
pub use point::{Point3, Vec2};
pub use view::ViewWindow;
