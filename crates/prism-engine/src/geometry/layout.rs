use std::sync::Arc;

use super::VertexBuffer;

/// Size of one vertex element (`f32`) in bytes.
pub const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

/// Memory layout of one float attribute inside a vertex buffer.
///
/// Vertex `i` starts at `offset + i * stride` bytes and holds `components`
/// consecutive floats. Elements are always 32-bit floats read without
/// normalization.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    components: u8,
    stride: u64,
    offset: u64,
}

impl VertexLayout {
    /// `stride == 0` means tightly packed (`components * 4` bytes).
    ///
    /// Returns `None` unless `components` is in `1..=4`.
    pub fn new(components: u8, stride: u64, offset: u64) -> Option<Self> {
        if !(1..=4).contains(&components) {
            return None;
        }
        let stride = if stride == 0 {
            components as u64 * FLOAT_SIZE
        } else {
            stride
        };
        Some(Self {
            components,
            stride,
            offset,
        })
    }

    pub fn components(&self) -> u8 {
        self.components
    }

    /// Effective stride in bytes; never zero.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes read per vertex.
    pub fn element_size(&self) -> u64 {
        self.components as u64 * FLOAT_SIZE
    }

    pub fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    /// Number of whole vertices readable from a buffer of `size_bytes`.
    pub fn available_vertices(&self, size_bytes: u64) -> u32 {
        let needed = self.offset + self.element_size();
        if size_bytes < needed {
            return 0;
        }
        let count = (size_bytes - needed) / self.stride + 1;
        count.min(u32::MAX as u64) as u32
    }

    /// The value vertex `index` reads from `data`.
    ///
    /// Components the layout does not supply are filled from `(0, 0, 0, 1)`,
    /// the same expansion the GPU applies to a wider shader input. `None` when
    /// the vertex lies past the end of `data`.
    pub fn fetch(&self, data: &[f32], index: u32) -> Option<[f32; 4]> {
        let size_bytes = std::mem::size_of_val(data) as u64;
        if index >= self.available_vertices(size_bytes) {
            return None;
        }

        let start_byte = self.offset + index as u64 * self.stride;
        // Offsets and strides are float-aligned, enforced when binding.
        let start = (start_byte / FLOAT_SIZE) as usize;

        let mut value = [0.0, 0.0, 0.0, 1.0];
        value[..self.components as usize]
            .copy_from_slice(&data[start..start + self.components as usize]);
        Some(value)
    }
}

/// One program attribute slot fed from a vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexLayoutBinding {
    attribute: String,
    location: u32,
    layout: VertexLayout,
    buffer: Arc<VertexBuffer>,
}

impl VertexLayoutBinding {
    pub(crate) fn new(
        attribute: impl Into<String>,
        location: u32,
        layout: VertexLayout,
        buffer: Arc<VertexBuffer>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            location,
            layout,
            buffer,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn location(&self) -> u32 {
        self.location
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn buffer(&self) -> &Arc<VertexBuffer> {
        &self.buffer
    }

    pub fn available_vertices(&self) -> u32 {
        self.layout.available_vertices(self.buffer.size_bytes())
    }

    pub fn fetch(&self, index: u32) -> Option<[f32; 4]> {
        self.layout.fetch(self.buffer.contents(), index)
    }

    /// The single attribute of this binding's vertex buffer slot.
    ///
    /// The byte offset is applied when the buffer slice is bound, so the
    /// attribute itself always starts at 0 within the stride.
    pub(crate) fn vertex_attribute(&self) -> wgpu::VertexAttribute {
        wgpu::VertexAttribute {
            format: self.layout.format(),
            offset: 0,
            shader_location: self.location,
        }
    }
}
