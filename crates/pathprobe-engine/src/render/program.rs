/// Compiled shading program used for every mask and probe draw.
///
/// Contract for custom modules:
/// - vertex input `@location(0) vec3<f32>` position in world meters
/// - vertex input `@location(1) vec4<f32>` straight-alpha color
/// - `@group(0) @binding(0)` uniform `{ scale: vec2<f32>, offset: vec2<f32> }`
///   mapping world XY to NDC
/// - one `vec4<f32>` color output
pub struct ProbeProgram {
    module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
}

impl ProbeProgram {
    /// Compiles the bundled WGSL program.
    pub fn bundled(device: &wgpu::Device) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pathprobe probe shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/probe.wgsl").into()),
        });
        Self::from_module(module, "vs_main", "fs_main")
    }

    /// Wraps a module compiled by the host application.
    pub fn from_module(
        module: wgpu::ShaderModule,
        vertex_entry: impl Into<String>,
        fragment_entry: impl Into<String>,
    ) -> Self {
        Self {
            module,
            vertex_entry: vertex_entry.into(),
            fragment_entry: fragment_entry.into(),
        }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}
