use crate::analyzer::PixelCount;
use crate::coords::{ColorRgba, ViewWindow};
use crate::geometry::TriangleMesh;

use super::raster::rasterize_triangle;

/// Depth every fragment is written at. Geometry is flat, so depth only has to
/// pass the `Less` test against the cleared value.
const FRAGMENT_DEPTH: f32 = 0.0;

const CLEAR_DEPTH: f32 = 1.0;

/// Stencil reference value marking the stamped region.
const MASK_REF: u8 = 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum StencilMode {
    /// Always pass, replace with the reference.
    Stamp,
    /// Pass only where stencil equals the reference; no writes.
    Equal,
    /// Always pass; no writes.
    Bypass,
}

/// CPU render surface: RGBA8 color, `f32` depth, and 8-bit stencil planes
/// driven through the same mask-then-probe protocol as the GPU path.
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    view: ViewWindow,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
    stencil: Vec<u8>,
    /// Fragment counter of the open query, if any.
    query: Option<u64>,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32, view: ViewWindow) -> Self {
        let len = width as usize * height as usize;
        let mut surface = Self {
            width,
            height,
            view,
            color: vec![[0; 4]; len],
            depth: vec![CLEAR_DEPTH; len],
            stencil: vec![0; len],
            query: None,
        };
        surface.reset();
        surface
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Clears color to opaque white, depth to 1.0, and stencil to 0.
    pub fn reset(&mut self) {
        self.color.fill([255; 4]);
        self.clear_depth_stencil();
    }

    fn clear_depth_stencil(&mut self) {
        self.depth.fill(CLEAR_DEPTH);
        self.stencil.fill(0);
    }

    /// Clears depth and stencil, then stamps `region` into the stencil plane.
    pub fn begin_mask(&mut self, region: &TriangleMesh, color: ColorRgba) {
        self.clear_depth_stencil();
        self.draw(region, color, StencilMode::Stamp);
    }

    /// Draws `probe` where the stamped mask is set.
    pub fn draw_probe(&mut self, probe: &TriangleMesh, color: ColorRgba) {
        self.draw(probe, color, StencilMode::Equal);
    }

    /// Draws `probe` ignoring the stencil plane.
    pub fn draw_unmasked(&mut self, probe: &TriangleMesh, color: ColorRgba) {
        self.draw(probe, color, StencilMode::Bypass);
    }

    /// Counts fragments that pass all tests while `draw` runs.
    ///
    /// A nested count closes the outer query early; the outer measurement is
    /// then reported as unavailable.
    pub fn count_pixels<F>(&mut self, draw: F) -> PixelCount
    where
        F: FnOnce(&mut Self),
    {
        self.query = Some(0);
        draw(self);
        self.query.take().map_or(PixelCount::Unavailable, PixelCount::Counted)
    }

    /// Color plane as tightly packed RGBA8 rows, top row first.
    pub fn read_color(&self) -> Vec<u8> {
        self.color.iter().flatten().copied().collect()
    }

    /// Stencil value at a framebuffer pixel.
    pub fn stencil_at(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.stencil[self.index(x, y)])
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn draw(&mut self, mesh: &TriangleMesh, color: ColorRgba, mode: StencilMode) {
        let (w, h, view) = (self.width, self.height, self.view);
        let src = color.to_array();

        for tri in mesh.triangles() {
            let fb = tri.map(|p| view.to_framebuffer(p.xy(), w, h));
            rasterize_triangle(fb, w, h, |x, y| {
                let i = self.index(x, y);

                // Depth test (`Less`, no writes).
                if !(FRAGMENT_DEPTH < self.depth[i]) {
                    return;
                }

                match mode {
                    StencilMode::Stamp => self.stencil[i] = MASK_REF,
                    StencilMode::Equal if self.stencil[i] != MASK_REF => return,
                    StencilMode::Equal | StencilMode::Bypass => {}
                }

                blend_straight_alpha(&mut self.color[i], src);
                if let Some(n) = self.query.as_mut() {
                    *n += 1;
                }
            });
        }
    }
}

fn blend_straight_alpha(dst: &mut [u8; 4], src: [f32; 4]) {
    let a = src[3].clamp(0.0, 1.0);
    for c in 0..3 {
        let d = f32::from(dst[c]) / 255.0;
        let out = src[c].clamp(0.0, 1.0) * a + d * (1.0 - a);
        dst[c] = (out * 255.0).round() as u8;
    }
    let da = f32::from(dst[3]) / 255.0;
    dst[3] = ((a + da * (1.0 - a)) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Point3, Vec2};

    fn surface() -> SoftwareSurface {
        // 1 px per meter, x and y in [0, 10).
        SoftwareSurface::new(10, 10, ViewWindow::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)))
    }

    fn quad(x0: f32, y0: f32, x1: f32, y1: f32) -> TriangleMesh {
        TriangleMesh::strip(vec![
            Point3::flat(x0, y0),
            Point3::flat(x0, y1),
            Point3::flat(x1, y0),
            Point3::flat(x1, y1),
        ])
    }

    const BLUE: ColorRgba = ColorRgba::new(0.0, 0.0, 1.0, 0.5);

    #[test]
    fn unmasked_count_is_pixel_area() {
        let mut s = surface();
        let n = s.count_pixels(|s| s.draw_unmasked(&quad(2.0, 2.0, 6.0, 5.0), BLUE));
        assert_eq!(n, PixelCount::Counted(12));
    }

    #[test]
    fn probe_is_clipped_to_mask() {
        let mut s = surface();
        s.begin_mask(&quad(0.0, 0.0, 5.0, 10.0), BLUE);
        let n = s.count_pixels(|s| s.draw_probe(&quad(3.0, 0.0, 7.0, 2.0), BLUE));
        assert_eq!(n, PixelCount::Counted(4));
    }

    #[test]
    fn begin_mask_discards_previous_mask() {
        let mut s = surface();
        s.begin_mask(&quad(0.0, 0.0, 5.0, 10.0), BLUE);
        s.begin_mask(&quad(5.0, 0.0, 10.0, 10.0), BLUE);
        let n = s.count_pixels(|s| s.draw_probe(&quad(0.0, 0.0, 5.0, 10.0), BLUE));
        assert_eq!(n, PixelCount::Counted(0));
    }

    #[test]
    fn probe_without_mask_counts_nothing() {
        let mut s = surface();
        let n = s.count_pixels(|s| s.draw_probe(&quad(0.0, 0.0, 10.0, 10.0), BLUE));
        assert_eq!(n, PixelCount::Counted(0));
    }

    #[test]
    fn stamp_marks_region_in_stencil() {
        let mut s = surface();
        s.begin_mask(&quad(0.0, 0.0, 5.0, 10.0), BLUE);
        assert_eq!(s.stencil_at(2, 2), Some(1));
        assert_eq!(s.stencil_at(7, 2), Some(0));
        assert_eq!(s.stencil_at(10, 2), None);
    }

    #[test]
    fn reset_restores_white() {
        let mut s = surface();
        s.draw_unmasked(&quad(0.0, 0.0, 10.0, 10.0), BLUE);
        assert_ne!(&s.read_color()[..4], &[255, 255, 255, 255]);
        s.reset();
        assert!(s.read_color().iter().all(|&b| b == 255));
    }

    #[test]
    fn nested_count_reports_outer_unavailable() {
        let mut s = surface();
        let outer = s.count_pixels(|s| {
            let inner = s.count_pixels(|s| s.draw_unmasked(&quad(0.0, 0.0, 1.0, 1.0), BLUE));
            assert_eq!(inner, PixelCount::Counted(1));
        });
        assert_eq!(outer, PixelCount::Unavailable);
    }
}
