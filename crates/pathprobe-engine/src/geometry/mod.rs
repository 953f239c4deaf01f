//! Input shapes and their conversion to flat triangle meshes.

mod mesh;
mod shapes;
mod triangulate;

pub use mesh::{Topology, TriangleMesh};
pub use shapes::{Freespace, FreespaceRay, Lane, LaneId, Obstacle, ObstacleId};
pub use triangulate::{triangulate_freespace, triangulate_lane, triangulate_obstacle, Footprint};
