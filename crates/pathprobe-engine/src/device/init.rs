/// Initialization parameters for headless GPU acquisition.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may pick an adapter from.
    ///
    /// Defaults to the primary backends (Vulkan, Metal, DX12). The GL backend
    /// reports occlusion queries as visibility booleans rather than sample
    /// counts, which the backend calibration rejects anyway.
    pub backends: wgpu::Backends,

    /// Adapter preference.
    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter (e.g. lavapipe, WARP) when available.
    pub force_fallback_adapter: bool,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_limits: wgpu::Limits::default(),
        }
    }
}
