use super::Vec2;

/// World-space rectangle (meters) mapped onto the full render surface.
///
/// World +Y maps to the top of the surface. Geometry outside the window is
/// clipped and contributes no pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewWindow {
    pub min: Vec2,
    pub max: Vec2,
}

impl ViewWindow {
    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Returns `(scale, offset)` such that `ndc = world * scale + offset`.
    ///
    /// This is the layout of the view uniform consumed by the probe program.
    pub fn ndc_transform(self) -> ([f32; 2], [f32; 2]) {
        let sx = 2.0 / self.width();
        let sy = 2.0 / self.height();
        ([sx, sy], [-1.0 - self.min.x * sx, -1.0 - self.min.y * sy])
    }

    /// Maps a world point to normalized device coordinates.
    #[inline]
    pub fn to_ndc(self, p: Vec2) -> Vec2 {
        let (s, o) = self.ndc_transform();
        Vec2::new(p.x * s[0] + o[0], p.y * s[1] + o[1])
    }

    /// Maps a world point to framebuffer coordinates (origin top-left, +Y down)
    /// on a `width` x `height` surface.
    ///
    /// Goes through NDC in `f32` exactly like the vertex shader does.
    pub fn to_framebuffer(self, p: Vec2, width: u32, height: u32) -> (f64, f64) {
        let ndc = self.to_ndc(p);
        let fx = (f64::from(ndc.x) + 1.0) * 0.5 * f64::from(width);
        let fy = (1.0 - f64::from(ndc.y)) * 0.5 * f64::from(height);
        (fx, fy)
    }

    /// Area in square meters covered by a single pixel.
    pub fn pixel_area(self, width: u32, height: u32) -> f32 {
        (self.width() / width.max(1) as f32) * (self.height() / height.max(1) as f32)
    }
}

impl Default for ViewWindow {
    /// 110 m square: 10 m behind the vehicle to 100 m ahead, 55 m to each side.
    fn default() -> Self {
        Self::new(Vec2::new(-10.0, -55.0), Vec2::new(100.0, 55.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ViewWindow {
        ViewWindow::new(Vec2::new(-10.0, -5.0), Vec2::new(10.0, 5.0))
    }

    #[test]
    fn corners_map_to_ndc_corners() {
        let w = window();
        assert_eq!(w.to_ndc(w.min), Vec2::new(-1.0, -1.0));
        assert_eq!(w.to_ndc(w.max), Vec2::new(1.0, 1.0));
        assert_eq!(w.to_ndc(Vec2::new(0.0, 0.0)), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn world_up_is_framebuffer_top() {
        let (x, y) = window().to_framebuffer(Vec2::new(-10.0, 5.0), 200, 100);
        assert_eq!((x, y), (0.0, 0.0));
        let (x, y) = window().to_framebuffer(Vec2::new(10.0, -5.0), 200, 100);
        assert_eq!((x, y), (200.0, 100.0));
    }

    #[test]
    fn empty_window_is_invalid() {
        let w = ViewWindow::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 5.0));
        assert!(!w.is_valid());
        assert!(ViewWindow::default().is_valid());
    }

    #[test]
    fn pixel_area_of_default_window() {
        let a = ViewWindow::default().pixel_area(800, 800);
        assert!((a - 0.137_5 * 0.137_5).abs() < 1e-6);
    }
}
