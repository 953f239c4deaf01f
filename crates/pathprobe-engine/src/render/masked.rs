use std::collections::HashMap;
use std::ops::Range;

use crate::analyzer::ProbeScene;
use crate::coords::ColorRgba;
use crate::geometry::{Topology, TriangleMesh};

use super::common::{ProbeVertex, StencilMode, ViewUniform, MASK_REF};
use super::surface::{DepthStencilLoad, RenderSurface};
use super::{ProbeProgram, RenderCtx};

/// Where one uploaded mesh lives in the shared vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRange {
    pub vertices: Range<u32>,
    pub topology: Topology,
}

/// Draw ranges of every mesh of the last uploaded scene, in scene order.
#[derive(Debug, Clone, Default)]
pub struct SceneRanges {
    pub regions: Vec<DrawRange>,
    pub probes: Vec<DrawRange>,
}

/// Runs the stencil protocol: stamp a region, then draw probes that only
/// survive inside it.
///
/// One pipeline per stencil mode and topology. All of them share the same
/// program, blend, and depth state; only stencil ops and primitive assembly
/// differ.
pub struct MaskedRenderer {
    pipelines: HashMap<(StencilMode, Topology), wgpu::RenderPipeline>,

    bind_group: wgpu::BindGroup,
    view_ubo: wgpu::Buffer,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
}

impl MaskedRenderer {
    pub fn new(ctx: &RenderCtx<'_>, program: &ProbeProgram) -> Self {
        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("pathprobe view bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("pathprobe pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let mut pipelines = HashMap::new();
        for mode in StencilMode::ALL {
            for topology in [Topology::TriangleList, Topology::TriangleStrip] {
                let pipeline = build_pipeline(ctx, program, &pipeline_layout, mode, topology);
                pipelines.insert((mode, topology), pipeline);
            }
        }

        let view_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathprobe view ubo"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pathprobe view bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_ubo.as_entire_binding(),
            }],
        });

        let renderer = Self {
            pipelines,
            bind_group,
            view_ubo,
            vbo: None,
            vbo_capacity: 0,
        };
        renderer.write_view_uniform(ctx);
        renderer
    }

    /// Uploads every region and probe of `scene` into one vertex buffer,
    /// baking each mesh's color into its vertices.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, scene: &ProbeScene) -> SceneRanges {
        self.write_view_uniform(ctx);

        let mut vertices = Vec::with_capacity(scene.vertex_count());
        let mut ranges = SceneRanges::default();

        for (i, mesh) in scene.regions.iter().enumerate() {
            let color = scene.region_colors.get(i).copied().unwrap_or_default();
            ranges.regions.push(append_mesh(&mut vertices, mesh, color));
        }
        for mesh in &scene.probes {
            ranges.probes.push(append_mesh(&mut vertices, mesh, scene.probe_color));
        }

        if vertices.is_empty() {
            return ranges;
        }

        self.ensure_vertex_capacity(ctx, vertices.len());
        if let Some(vbo) = self.vbo.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&vertices));
        }
        log::trace!(
            "uploaded {} vertices ({} regions, {} probes)",
            vertices.len(),
            ranges.regions.len(),
            ranges.probes.len()
        );
        ranges
    }

    /// Opens a pass with depth and stencil cleared and stamps `region` into
    /// the stencil buffer. Probes drawn into the returned pass are masked.
    pub fn begin_mask<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        surface: &RenderSurface,
        region: &DrawRange,
        queries: Option<&wgpu::QuerySet>,
    ) -> wgpu::RenderPass<'e> {
        let mut pass = surface.begin_pass(encoder, DepthStencilLoad::Clear, queries);
        self.draw(&mut pass, StencilMode::Stamp, region);
        pass
    }

    /// Draws `probe` where the stencil holds the mask value.
    pub fn draw_probe(&self, pass: &mut wgpu::RenderPass<'_>, probe: &DrawRange) {
        self.draw(pass, StencilMode::Equal, probe);
    }

    /// Draws `probe` with the stencil test bypassed.
    pub fn draw_unmasked(&self, pass: &mut wgpu::RenderPass<'_>, probe: &DrawRange) {
        self.draw(pass, StencilMode::Bypass, probe);
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, mode: StencilMode, range: &DrawRange) {
        if range.vertices.is_empty() {
            return;
        }
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(pipeline) = self.pipelines.get(&(mode, range.topology)) else { return };

        pass.set_pipeline(pipeline);
        pass.set_stencil_reference(MASK_REF);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vbo.slice(..));
        pass.draw(range.vertices.clone(), 0..1);
    }

    fn write_view_uniform(&self, ctx: &RenderCtx<'_>) {
        let u = ViewUniform::from_window(ctx.view);
        ctx.queue.write_buffer(&self.view_ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required_vertices: usize) {
        if required_vertices <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }

        let new_cap = required_vertices.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<ProbeVertex>()) as u64;

        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathprobe vertex buffer"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }
}

fn append_mesh(out: &mut Vec<ProbeVertex>, mesh: &TriangleMesh, color: ColorRgba) -> DrawRange {
    let start = out.len() as u32;
    let color = color.to_array();
    out.extend(mesh.vertices.iter().map(|p| ProbeVertex {
        position: p.to_array(),
        color,
    }));
    DrawRange {
        vertices: start..out.len() as u32,
        topology: mesh.topology,
    }
}

fn build_pipeline(
    ctx: &RenderCtx<'_>,
    program: &ProbeProgram,
    layout: &wgpu::PipelineLayout,
    mode: StencilMode,
    topology: Topology,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("pathprobe probe pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: program.module(),
            entry_point: Some(program.vertex_entry()),
            compilation_options: Default::default(),
            buffers: &[ProbeVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: program.module(),
            entry_point: Some(program.fragment_entry()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: topology.to_wgpu(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(mode.depth_stencil_state(ctx.depth_stencil_format)),
        multisample: wgpu::MultisampleState {
            count: 1,
            ..Default::default()
        },

        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point3;

    // ── vertex packing ────────────────────────────────────────────────────

    #[test]
    fn meshes_are_packed_back_to_back() {
        let mut out = Vec::new();
        let quad = TriangleMesh::strip(vec![Point3::flat(0.0, 0.0); 4]);
        let ribbon = TriangleMesh::list(vec![Point3::flat(1.0, 2.0); 6]);

        let a = append_mesh(&mut out, &quad, ColorRgba::white());
        let b = append_mesh(&mut out, &ribbon, ColorRgba::new(1.0, 0.0, 0.0, 0.25));

        assert_eq!(a.vertices, 0..4);
        assert_eq!(a.topology, Topology::TriangleStrip);
        assert_eq!(b.vertices, 4..10);
        assert_eq!(b.topology, Topology::TriangleList);
        assert_eq!(out[4].position, [1.0, 2.0, 0.0]);
        assert_eq!(out[4].color, [1.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn empty_mesh_yields_empty_range() {
        let mut out = Vec::new();
        let r = append_mesh(&mut out, &TriangleMesh::list(Vec::new()), ColorRgba::white());
        assert!(r.vertices.is_empty());
        assert!(out.is_empty());
    }
}
