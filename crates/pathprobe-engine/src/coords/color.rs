/// Straight-alpha RGBA color.
///
/// Colors only affect the debug image in the color attachment; pixel counts
/// never depend on them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Same color with alpha replaced.
    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

/// Fixed lane palette. Red, green, blue, yellow, magenta, cyan.
pub const LANE_PALETTE: [ColorRgba; 6] = [
    ColorRgba::new(1.0, 0.0, 0.0, 1.0),
    ColorRgba::new(0.0, 1.0, 0.0, 1.0),
    ColorRgba::new(0.0, 0.0, 1.0, 1.0),
    ColorRgba::new(1.0, 1.0, 0.0, 1.0),
    ColorRgba::new(1.0, 0.0, 1.0, 1.0),
    ColorRgba::new(0.0, 1.0, 1.0, 1.0),
];

/// Mask color for the region drawn at position `index` within one call.
#[inline]
pub fn lane_color(index: usize, alpha: f32) -> ColorRgba {
    LANE_PALETTE[index % LANE_PALETTE.len()].with_alpha(alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_every_six_lanes() {
        assert_eq!(lane_color(0, 0.25), lane_color(6, 0.25));
        assert_eq!(lane_color(5, 0.25), lane_color(11, 0.25));
        assert_ne!(lane_color(0, 0.25), lane_color(1, 0.25));
    }

    #[test]
    fn lane_color_applies_alpha() {
        assert_eq!(lane_color(2, 0.3).a, 0.3);
        assert_eq!(lane_color(2, 0.3).b, 1.0);
    }
}
