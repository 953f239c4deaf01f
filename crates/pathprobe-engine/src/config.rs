use std::time::Duration;

use crate::coords::{ColorRgba, ViewWindow};

/// When occlusion query results are read back to the CPU.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReadbackMode {
    /// Submit and wait after every probe. One pipeline stall per
    /// region × probe pair.
    PerProbe,
    /// Record all probes of one region into a single pass and read them back
    /// together. One stall per region; a failed readback degrades every
    /// probe of that pass.
    PerRegion,
}

/// Analyzer configuration.
///
/// Resolution and view window together fix the quantization: one pixel covers
/// `view.width() / width` by `view.height() / height` meters.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Render surface width in pixels.
    pub width: u32,

    /// Render surface height in pixels.
    pub height: u32,

    /// World rectangle mapped onto the surface.
    pub view: ViewWindow,

    /// Readback batching policy for the GPU backend.
    pub readback: ReadbackMode,

    /// Upper bound on each blocking readback. Exceeding it turns the
    /// affected measurements into unavailable counts instead of hanging.
    pub query_timeout: Duration,

    /// Alpha of the palette color used to draw region masks.
    pub mask_alpha: f32,

    /// Color used for probe draws.
    pub probe_color: ColorRgba,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            view: ViewWindow::default(),
            readback: ReadbackMode::PerRegion,
            query_timeout: Duration::from_secs(2),
            mask_alpha: 0.25,
            probe_color: ColorRgba::new(0.0, 0.0, 1.0, 0.5),
        }
    }
}

impl AnalyzerConfig {
    /// Checks values the backends cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(crate::error::AnalyzerError::init(format!(
                "surface size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.view.is_valid() {
            return Err(crate::error::AnalyzerError::init(format!(
                "view window must have positive finite extent, got {:?}",
                self.view
            )));
        }
        Ok(())
    }
}
