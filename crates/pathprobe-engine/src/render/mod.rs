//! GPU measurement path.
//!
//! Every draw goes into one off-screen [`RenderSurface`]. The
//! [`MaskedRenderer`] stamps region masks into its stencil buffer and draws
//! probes against them; the [`OcclusionCounter`] wraps probe draws in
//! occlusion queries and reads the sample counts back.
//!
//! Convention:
//! - CPU geometry is in world meters (+X forward, +Y left).
//! - The vertex shader maps world XY to NDC with a view uniform; world +Y is
//!   the top of the framebuffer.

mod backend;
mod common;
mod ctx;
mod masked;
mod occlusion;
mod program;
mod surface;

pub use backend::GpuProbeBackend;
pub use common::StencilMode;
pub use ctx::RenderCtx;
pub use masked::{DrawRange, MaskedRenderer, SceneRanges};
pub use occlusion::{OcclusionCounter, MAX_QUERIES};
pub use program::ProbeProgram;
pub use surface::{DepthStencilLoad, RenderSurface};

#[cfg(test)]
mod tests;
