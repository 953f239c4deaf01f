use crate::coords::Point3;

/// How a mesh's vertex sequence is assembled into triangles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    /// Every three vertices form an independent triangle.
    TriangleList,
    /// Vertex `i` forms a triangle with vertices `i - 1` and `i - 2`.
    TriangleStrip,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Flat triangle vertex list ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3>,
    pub topology: Topology,
}

impl TriangleMesh {
    #[inline]
    pub fn list(vertices: Vec<Point3>) -> Self {
        Self { vertices, topology: Topology::TriangleList }
    }

    #[inline]
    pub fn strip(vertices: Vec<Point3>) -> Self {
        Self { vertices, topology: Topology::TriangleStrip }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        let n = self.vertices.len();
        match self.topology {
            Topology::TriangleList => n / 3,
            Topology::TriangleStrip => n.saturating_sub(2),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterates the assembled triangles regardless of topology.
    ///
    /// Strip triangles keep the vertex order `(i, i+1, i+2)`; winding is
    /// irrelevant because no backend culls faces.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        let v = &self.vertices;
        let (step, count) = match self.topology {
            Topology::TriangleList => (3, v.len() / 3),
            Topology::TriangleStrip => (1, v.len().saturating_sub(2)),
        };
        (0..count).map(move |t| {
            let i = t * step;
            [v[i], v[i + 1], v[i + 2]]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point3 {
        Point3::flat(x, y)
    }

    #[test]
    fn strip_assembles_overlapping_triangles() {
        let mesh = TriangleMesh::strip(vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0), p(1.0, 1.0)]);
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0], [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)]);
        assert_eq!(tris[1], [p(0.0, 1.0), p(1.0, 0.0), p(1.0, 1.0)]);
    }

    #[test]
    fn list_ignores_trailing_partial_triangle() {
        let mesh = TriangleMesh::list(vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn short_strip_is_empty() {
        assert!(TriangleMesh::strip(vec![p(0.0, 0.0), p(1.0, 1.0)]).is_empty());
    }
}
