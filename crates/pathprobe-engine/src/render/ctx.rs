use crate::coords::ViewWindow;

/// What a renderer needs to build pipelines and upload data: device, queue,
/// attachment formats, and the world window being viewed.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
    pub depth_stencil_format: wgpu::TextureFormat,
    pub view: ViewWindow,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_stencil_format: wgpu::TextureFormat,
        view: ViewWindow,
    ) -> Self {
        Self {
            device,
            queue,
            color_format,
            depth_stencil_format,
            view,
        }
    }
}
