/// Represents a single acquired surface frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Size of the acquired surface texture in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.surface_texture.texture.size();
        (size.width, size.height)
    }
}
