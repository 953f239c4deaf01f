use crate::error::{AnalyzerError, Result};

use super::{Freespace, Lane, Obstacle, TriangleMesh};

/// Emits the four boundary points as a triangle strip, in input order.
pub fn triangulate_obstacle(obstacle: &Obstacle) -> TriangleMesh {
    TriangleMesh::strip(obstacle.boundary_points.to_vec())
}

/// Converts a lane ribbon into a triangle list, two triangles per segment.
///
/// For segment `i` the triangles are `(L[i], L[i+1], R[i])` and
/// `(L[i+1], R[i], R[i+1])`. A list rather than a strip keeps every quad's
/// triangles independent of its neighbours.
pub fn triangulate_lane(lane: &Lane) -> Result<TriangleMesh> {
    let left = &lane.left_boundary;
    let right = &lane.right_boundary;

    if left.len() != right.len() {
        return Err(AnalyzerError::ShapeMismatch {
            lane_id: lane.id,
            left: left.len(),
            right: right.len(),
        });
    }
    if left.len() < 2 {
        return Err(AnalyzerError::DegenerateRegion {
            region_id: lane.id,
            reason: format!("lane needs at least 2 stations, got {}", left.len()),
        });
    }

    let mut vertices = Vec::with_capacity((left.len() - 1) * 6);
    for i in 0..left.len() - 1 {
        vertices.extend_from_slice(&[left[i], left[i + 1], right[i]]);
        vertices.extend_from_slice(&[left[i + 1], right[i], right[i + 1]]);
    }

    Ok(TriangleMesh::list(vertices))
}

/// Converts polar freespace into a triangle fan around its origin, emitted as
/// a triangle list.
pub fn triangulate_freespace(freespace: &Freespace) -> Result<TriangleMesh> {
    if freespace.rays.len() < 2 {
        return Err(AnalyzerError::DegenerateRegion {
            region_id: freespace.id,
            reason: format!("freespace needs at least 2 rays, got {}", freespace.rays.len()),
        });
    }

    let mut vertices = Vec::with_capacity((freespace.rays.len() - 1) * 3);
    for pair in freespace.rays.windows(2) {
        vertices.push(freespace.origin);
        vertices.push(freespace.ray_point(pair[0]));
        vertices.push(freespace.ray_point(pair[1]));
    }

    Ok(TriangleMesh::list(vertices))
}

/// A shape that can be rasterized as a mask region or a probe.
pub trait Footprint {
    fn footprint_id(&self) -> i64;

    fn triangulate(&self) -> Result<TriangleMesh>;
}

impl Footprint for Lane {
    fn footprint_id(&self) -> i64 {
        self.id
    }

    fn triangulate(&self) -> Result<TriangleMesh> {
        triangulate_lane(self)
    }
}

impl Footprint for Freespace {
    fn footprint_id(&self) -> i64 {
        self.id
    }

    fn triangulate(&self) -> Result<TriangleMesh> {
        triangulate_freespace(self)
    }
}

impl Footprint for Obstacle {
    fn footprint_id(&self) -> i64 {
        self.id
    }

    fn triangulate(&self) -> Result<TriangleMesh> {
        Ok(triangulate_obstacle(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Point3, Vec2};
    use crate::geometry::{FreespaceRay, Topology};

    fn p(x: f32, y: f32) -> Point3 {
        Point3::flat(x, y)
    }

    // ── obstacle ──────────────────────────────────────────────────────────

    #[test]
    fn obstacle_keeps_input_order_as_strip() {
        let ob = Obstacle::axis_aligned(3, Vec2::new(20.0, -0.75), Vec2::new(25.0, 0.75));
        let mesh = triangulate_obstacle(&ob);
        assert_eq!(mesh.topology, Topology::TriangleStrip);
        assert_eq!(mesh.vertices, ob.boundary_points.to_vec());
        assert_eq!(mesh.triangle_count(), 2);
    }

    // ── lane ──────────────────────────────────────────────────────────────

    #[test]
    fn lane_emits_six_vertices_per_segment() {
        let lane = Lane::new(
            1,
            vec![p(0.0, 1.0), p(10.0, 1.0), p(20.0, 1.5)],
            vec![p(0.0, -1.0), p(10.0, -1.0), p(20.0, -0.5)],
        );
        let mesh = triangulate_lane(&lane).unwrap();
        assert_eq!(mesh.topology, Topology::TriangleList);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(&mesh.vertices[..3], &[p(0.0, 1.0), p(10.0, 1.0), p(0.0, -1.0)]);
        assert_eq!(&mesh.vertices[3..6], &[p(10.0, 1.0), p(0.0, -1.0), p(10.0, -1.0)]);
        assert_eq!(&mesh.vertices[6..9], &[p(10.0, 1.0), p(20.0, 1.5), p(10.0, -1.0)]);
    }

    #[test]
    fn lane_length_mismatch_is_rejected() {
        let lane = Lane::new(9, vec![p(0.0, 1.0), p(1.0, 1.0)], vec![p(0.0, 0.0)]);
        assert_eq!(
            triangulate_lane(&lane),
            Err(AnalyzerError::ShapeMismatch { lane_id: 9, left: 2, right: 1 })
        );
    }

    #[test]
    fn single_station_lane_is_degenerate() {
        let lane = Lane::new(4, vec![p(0.0, 1.0)], vec![p(0.0, 0.0)]);
        assert!(matches!(
            triangulate_lane(&lane),
            Err(AnalyzerError::DegenerateRegion { region_id: 4, .. })
        ));
    }

    // ── freespace ─────────────────────────────────────────────────────────

    #[test]
    fn freespace_fans_around_origin() {
        let fs = Freespace::new(
            0,
            p(1.0, 2.0),
            vec![
                FreespaceRay::new(0.0, 2.0),
                FreespaceRay::new(std::f32::consts::FRAC_PI_2, 3.0),
                FreespaceRay::new(std::f32::consts::PI, 1.0),
            ],
        );
        let mesh = triangulate_freespace(&fs).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris[0][0], p(1.0, 2.0));
        assert_eq!(tris[0][1], p(3.0, 2.0));
        assert!((tris[0][2].x - 1.0).abs() < 1e-5);
        assert!((tris[0][2].y - 5.0).abs() < 1e-5);
        assert_eq!(tris[1][0], p(1.0, 2.0));
        assert!((tris[1][2].x - 0.0).abs() < 1e-5);
    }

    #[test]
    fn freespace_with_one_ray_is_degenerate() {
        let fs = Freespace::new(2, p(0.0, 0.0), vec![FreespaceRay::new(0.0, 5.0)]);
        assert!(triangulate_freespace(&fs).is_err());
    }
}
