/// Initialization parameters for a window-bound GPU context.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Vertex colours are written as-is by the triangle shaders, so hosts that
    /// want raw channel values on screen leave this off.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO is broadly supported and generally appropriate.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Initialization parameters for an offscreen (windowless) GPU context.
#[derive(Debug, Clone)]
pub struct HeadlessInit {
    /// Offscreen colour target size in pixels.
    pub width: u32,
    pub height: u32,

    /// Colour target format. Readback supports 8-bit RGBA/BGRA formats.
    pub format: wgpu::TextureFormat,

    /// Allow a software adapter when no hardware adapter is present.
    pub allow_fallback_adapter: bool,

    /// Limits requested from the adapter/device.
    ///
    /// Downlevel defaults keep software and GL backends eligible.
    pub required_limits: wgpu::Limits,
}

impl Default for HeadlessInit {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            format: wgpu::TextureFormat::Rgba8Unorm,
            allow_fallback_adapter: true,
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}
