use std::sync::Arc;

use crate::shader::{LinkedProgram, ProgramInterface, ScalarKind};

use super::{BindError, GeometryObject, VertexBuffer, VertexLayout, VertexLayoutBinding, FLOAT_SIZE};

/// Uploads vertex data and binds it to the attributes of one program.
///
/// ```rust,ignore
/// let binder = GeometryBinder::new(device, &program);
/// let mut tri = GeometryObject::new("tri1");
/// binder.prepare("position", 3, &TRI1, 0, 0, &mut tri)?;
/// binder.prepare("color", 4, &TRI1, 0, 4 * 9, &mut tri)?;
/// ```
pub struct GeometryBinder<'a> {
    device: &'a wgpu::Device,
    program: &'a LinkedProgram,
}

impl<'a> GeometryBinder<'a> {
    pub fn new(device: &'a wgpu::Device, program: &'a LinkedProgram) -> Self {
        Self { device, program }
    }

    /// Copies `data` into a new static vertex buffer and binds `attribute` to it.
    ///
    /// `stride == 0` means tightly packed. `offset` is the byte position of
    /// vertex 0. Everything is validated before the upload, so an error leaves
    /// `geometry` untouched and allocates nothing.
    pub fn prepare(
        &self,
        attribute: &str,
        components: u8,
        data: &[f32],
        stride: u64,
        offset: u64,
        geometry: &mut GeometryObject,
    ) -> Result<(), BindError> {
        let (location, layout) = plan_binding(
            self.program.interface(),
            &self.device.limits(),
            attribute,
            components,
            stride,
            offset,
            std::mem::size_of_val(data) as u64,
            geometry,
        )
        .inspect_err(|err| log::error!("{}: {err}", geometry.label()))?;

        let label = format!("{} {attribute} vbo", geometry.label());
        let buffer = VertexBuffer::upload(self.device, &label, data);

        self.attach(geometry, attribute, location, layout, Arc::new(buffer));
        Ok(())
    }

    /// Binds `attribute` to an already uploaded buffer.
    ///
    /// Lets several attributes share one buffer at different offsets.
    pub fn bind_buffer(
        &self,
        attribute: &str,
        components: u8,
        buffer: &Arc<VertexBuffer>,
        stride: u64,
        offset: u64,
        geometry: &mut GeometryObject,
    ) -> Result<(), BindError> {
        let (location, layout) = plan_binding(
            self.program.interface(),
            &self.device.limits(),
            attribute,
            components,
            stride,
            offset,
            buffer.size_bytes(),
            geometry,
        )
        .inspect_err(|err| log::error!("{}: {err}", geometry.label()))?;

        self.attach(geometry, attribute, location, layout, Arc::clone(buffer));
        Ok(())
    }

    fn attach(
        &self,
        geometry: &mut GeometryObject,
        attribute: &str,
        location: u32,
        layout: VertexLayout,
        buffer: Arc<VertexBuffer>,
    ) {
        let binding = VertexLayoutBinding::new(attribute, location, layout, buffer);
        if geometry.set_binding(binding).is_some() {
            log::debug!("{}: replaced binding for `{attribute}`", geometry.label());
        }
        log::debug!(
            "{}: `{attribute}` -> slot {location} ({} x f32, stride {}, offset {})",
            geometry.label(),
            layout.components(),
            layout.stride(),
            layout.offset()
        );
    }
}

/// Validates a binding request and resolves its slot.
#[allow(clippy::too_many_arguments)]
pub(crate) fn plan_binding(
    interface: &ProgramInterface,
    limits: &wgpu::Limits,
    attribute: &str,
    components: u8,
    stride: u64,
    offset: u64,
    data_bytes: u64,
    geometry: &GeometryObject,
) -> Result<(u32, VertexLayout), BindError> {
    let name = || attribute.to_owned();

    let Some(layout) = VertexLayout::new(components, stride, offset) else {
        return Err(BindError::InvalidComponentCount {
            attribute: name(),
            components,
        });
    };
    if stride % FLOAT_SIZE != 0 {
        return Err(BindError::MisalignedStride {
            attribute: name(),
            stride,
        });
    }
    if offset % FLOAT_SIZE != 0 {
        return Err(BindError::MisalignedOffset {
            attribute: name(),
            offset,
        });
    }

    if stride != 0 && stride < layout.element_size() {
        return Err(BindError::StrideTooSmall {
            attribute: name(),
            stride,
            element_size: layout.element_size(),
        });
    }

    let max_stride = limits.max_vertex_buffer_array_stride as u64;
    if layout.stride() > max_stride {
        return Err(BindError::StrideTooLarge {
            attribute: name(),
            stride: layout.stride(),
            max: max_stride,
        });
    }

    let Some(info) = interface.attribute(attribute) else {
        return Err(BindError::UnresolvedAttribute { attribute: name() });
    };
    if info.ty.kind != ScalarKind::Float || components > info.ty.components {
        return Err(BindError::TypeMismatch {
            attribute: name(),
            shader_type: info.ty,
            components,
        });
    }

    if layout.available_vertices(data_bytes) == 0 {
        return Err(BindError::InsufficientData {
            attribute: name(),
            needed_bytes: layout.offset() + layout.element_size(),
            available_bytes: data_bytes,
        });
    }

    let replaces = geometry.binding(info.location).is_some();
    if !replaces && geometry.bindings().len() as u32 >= limits.max_vertex_buffers {
        return Err(BindError::TooManyBindings {
            max: limits.max_vertex_buffers,
        });
    }

    Ok((info.location, layout))
}
