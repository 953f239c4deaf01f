//! Shared GPU types and fixed pipeline state.

use bytemuck::{Pod, Zeroable};

use crate::coords::ViewWindow;

/// Stencil value written by the mask pass and tested by probes.
pub(super) const MASK_REF: u32 = 1;

// ── stencil modes ─────────────────────────────────────────────────────────

/// Stencil configuration of a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilMode {
    /// Always pass, replace with [`MASK_REF`], write mask fully open.
    Stamp,
    /// Pass only where stencil equals [`MASK_REF`], no writes.
    Equal,
    /// Stencil test bypassed: always pass, no writes.
    Bypass,
}

impl StencilMode {
    pub(super) const ALL: [StencilMode; 3] = [StencilMode::Stamp, StencilMode::Equal, StencilMode::Bypass];

    fn face(self) -> wgpu::StencilFaceState {
        match self {
            StencilMode::Stamp => wgpu::StencilFaceState {
                compare: wgpu::CompareFunction::Always,
                fail_op: wgpu::StencilOperation::Zero,
                depth_fail_op: wgpu::StencilOperation::Replace,
                pass_op: wgpu::StencilOperation::Replace,
            },
            StencilMode::Equal => wgpu::StencilFaceState {
                compare: wgpu::CompareFunction::Equal,
                fail_op: wgpu::StencilOperation::Keep,
                depth_fail_op: wgpu::StencilOperation::Keep,
                pass_op: wgpu::StencilOperation::Keep,
            },
            StencilMode::Bypass => wgpu::StencilFaceState {
                compare: wgpu::CompareFunction::Always,
                fail_op: wgpu::StencilOperation::Keep,
                depth_fail_op: wgpu::StencilOperation::Keep,
                pass_op: wgpu::StencilOperation::Keep,
            },
        }
    }

    fn write_mask(self) -> u32 {
        match self {
            StencilMode::Stamp => 0xFF,
            StencilMode::Equal | StencilMode::Bypass => 0x00,
        }
    }

    /// Depth test `Less` with writes disabled, plus this mode's stencil state.
    ///
    /// Later draws must never be depth-occluded by earlier ones; every
    /// fragment sits at depth 0 against a cleared depth of 1.
    pub(super) fn depth_stencil_state(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let face = self.face();
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState {
                front: face,
                back: face,
                read_mask: 0xFF,
                write_mask: self.write_mask(),
            },
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ProbeVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ProbeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ProbeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── view uniform ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewUniform {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl ViewUniform {
    pub(super) fn from_window(view: ViewWindow) -> Self {
        let (scale, offset) = view.ndc_transform();
        Self { scale, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stamp_writes_stencil() {
        let f = wgpu::TextureFormat::Depth24PlusStencil8;
        assert_eq!(StencilMode::Stamp.depth_stencil_state(f).stencil.write_mask, 0xFF);
        assert_eq!(StencilMode::Equal.depth_stencil_state(f).stencil.write_mask, 0);
        assert_eq!(StencilMode::Bypass.depth_stencil_state(f).stencil.write_mask, 0);
    }

    #[test]
    fn depth_writes_are_always_off() {
        let f = wgpu::TextureFormat::Depth24PlusStencil8;
        for mode in StencilMode::ALL {
            let state = mode.depth_stencil_state(f);
            assert!(!state.depth_write_enabled);
            assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        }
    }

    #[test]
    fn probe_passes_only_on_mask() {
        let f = wgpu::TextureFormat::Depth24PlusStencil8;
        let state = StencilMode::Equal.depth_stencil_state(f);
        assert_eq!(state.stencil.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(state.stencil.front.pass_op, wgpu::StencilOperation::Keep);
    }

    #[test]
    fn vertex_layout_matches_program_contract() {
        assert_eq!(std::mem::size_of::<ProbeVertex>(), 28);
        assert_eq!(std::mem::size_of::<ViewUniform>(), 16);
    }
}
