use wgpu::util::DeviceExt;

/// Static vertex buffer: uploaded once, read by the GPU, never rewritten.
///
/// A host copy of the uploaded floats is kept so vertex fetches can be
/// inspected without reading GPU memory back.
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    contents: Box<[f32]>,
}

impl VertexBuffer {
    /// Copies `data` into a new GPU buffer. The caller's slice may be dropped
    /// right after.
    ///
    /// Empty data gives an empty buffer, which no attribute can bind.
    pub fn upload(device: &wgpu::Device, label: &str, data: &[f32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            contents: data.into(),
        }
    }

    pub fn contents(&self) -> &[f32] {
        &self.contents
    }

    pub fn size_bytes(&self) -> u64 {
        std::mem::size_of_val(&*self.contents) as u64
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl std::fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("floats", &self.contents.len())
            .finish()
    }
}
