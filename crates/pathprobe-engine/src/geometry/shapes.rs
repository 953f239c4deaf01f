use crate::coords::{Point3, Vec2};

pub type LaneId = i64;
pub type ObstacleId = i64;

/// Drivable lane as a ribbon between two boundary polylines.
///
/// Invariant (checked at triangulation): both boundaries have the same number
/// of stations, at least two. Station `i` on the left pairs with station `i`
/// on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: LaneId,
    pub left_boundary: Vec<Point3>,
    pub right_boundary: Vec<Point3>,
}

impl Lane {
    pub fn new(id: LaneId, left_boundary: Vec<Point3>, right_boundary: Vec<Point3>) -> Self {
        Self { id, left_boundary, right_boundary }
    }

    /// Straight lane along +X covering `x` in `[x0, x1]` and `y` in `[y_right, y_left]`.
    pub fn straight(id: LaneId, x0: f32, x1: f32, y_right: f32, y_left: f32) -> Self {
        Self::new(
            id,
            vec![Point3::flat(x0, y_left), Point3::flat(x1, y_left)],
            vec![Point3::flat(x0, y_right), Point3::flat(x1, y_right)],
        )
    }
}

/// Detected obstacle footprint (or ego footprint when probing freespace).
///
/// Points 0,1,2 and 1,2,3 each form a triangle; together they cover the quad.
/// For an axis-aligned box that means the order is two corners of one side
/// followed by the matching corners of the opposite side.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub boundary_points: [Point3; 4],
}

impl Obstacle {
    pub fn new(id: ObstacleId, boundary_points: [Point3; 4]) -> Self {
        Self { id, boundary_points }
    }

    /// Axis-aligned box footprint in strip order.
    pub fn axis_aligned(id: ObstacleId, min: Vec2, max: Vec2) -> Self {
        Self::new(
            id,
            [
                Point3::flat(min.x, min.y),
                Point3::flat(min.x, max.y),
                Point3::flat(max.x, min.y),
                Point3::flat(max.x, max.y),
            ],
        )
    }
}

/// One freespace ray: direction in radians (0 = +X, counter-clockwise) and
/// free distance in meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FreespaceRay {
    pub angle: f32,
    pub range: f32,
}

impl FreespaceRay {
    #[inline]
    pub const fn new(angle: f32, range: f32) -> Self {
        Self { angle, range }
    }
}

/// Polar freespace around a sensor origin.
///
/// Rays are expected in angular order. Consecutive rays bound one wedge; the
/// last and first ray are not joined unless the caller repeats the first ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Freespace {
    pub id: i64,
    pub origin: Point3,
    pub rays: Vec<FreespaceRay>,
}

impl Freespace {
    pub fn new(id: i64, origin: Point3, rays: Vec<FreespaceRay>) -> Self {
        Self { id, origin, rays }
    }

    /// End point of a ray.
    pub fn ray_point(&self, ray: FreespaceRay) -> Point3 {
        let (sin, cos) = ray.angle.sin_cos();
        Point3::new(
            self.origin.x + ray.range * cos,
            self.origin.y + ray.range * sin,
            self.origin.z,
        )
    }
}
