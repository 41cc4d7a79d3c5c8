use crate::coords::{ColorRgba, Viewport};
use crate::geometry::GeometryObject;
use crate::shader::{LinkedProgram, ProgramInterface};

use super::pipeline::PipelineCache;
use super::{DrawError, PrimitiveKind, RenderCtx, RenderTarget};

/// Parameters of one non-indexed draw starting at vertex 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub vertex_count: u32,
    pub primitive: PrimitiveKind,
}

impl Default for DrawCall {
    fn default() -> Self {
        Self {
            vertex_count: 3,
            primitive: PrimitiveKind::Triangles,
        }
    }
}

impl DrawCall {
    pub fn triangles(vertex_count: u32) -> Self {
        Self {
            vertex_count,
            primitive: PrimitiveKind::Triangles,
        }
    }
}

/// Records frames: one clear, then any number of geometry draws.
///
/// ```rust,ignore
/// driver.init_frame(&mut target, w, h, ColorRgba::transparent())?;
/// driver.draw_geometry(&ctx, &mut target, &program, &tri1, DrawCall::default())?;
/// driver.draw_geometry(&ctx, &mut target, &program, &tri2, DrawCall::default())?;
/// driver.finish_frame();
/// ```
#[derive(Default)]
pub struct FrameDriver {
    pipelines: PipelineCache,
    viewport: Option<Viewport>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport of the frame in progress, if any.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Number of distinct render pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Starts a frame: clears the whole target and sets the viewport to
    /// `(0, 0, width, height)`.
    pub fn init_frame(
        &mut self,
        target: &mut RenderTarget<'_>,
        width: u32,
        height: u32,
        clear: ColorRgba,
    ) -> Result<(), DrawError> {
        let viewport = Viewport::full(width, height);
        check_viewport(viewport, (target.width, target.height))
            .inspect_err(|err| log::error!("{err}"))?;

        {
            let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.viewport = Some(viewport);
        Ok(())
    }

    /// Draws `geometry` with `program` into the frame started by
    /// [`FrameDriver::init_frame`].
    pub fn draw_geometry(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        program: &LinkedProgram,
        geometry: &GeometryObject,
        call: DrawCall,
    ) -> Result<(), DrawError> {
        let viewport = self
            .viewport
            .ok_or(DrawError::FrameNotInitialized)
            .and_then(|vp| check_viewport(vp, (target.width, target.height)).map(|()| vp))
            .and_then(|vp| {
                check_geometry(program.interface(), geometry, call.vertex_count).map(|()| vp)
            })
            .inspect_err(|err| log::error!("{err}"))?;

        if call.vertex_count == 0 {
            log::debug!("{}: empty draw skipped", geometry.label());
            return Ok(());
        }

        let pipeline = self.pipelines.get_or_create(
            ctx.device,
            program,
            geometry,
            ctx.target_format,
            call.primitive,
        );

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism geometry pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(pipeline);
        for (slot, binding) in geometry.bindings().iter().enumerate() {
            let offset = binding.layout().offset();
            rpass.set_vertex_buffer(slot as u32, binding.buffer().raw().slice(offset..));
        }
        rpass.draw(0..call.vertex_count, 0..1);

        log::trace!(
            "{}: drew {} vertices as {:?}",
            geometry.label(),
            call.vertex_count,
            call.primitive
        );
        Ok(())
    }

    /// Ends the frame; the next frame needs [`FrameDriver::init_frame`] again.
    pub fn finish_frame(&mut self) {
        self.viewport = None;
    }
}

fn check_viewport(viewport: Viewport, target: (u32, u32)) -> Result<(), DrawError> {
    if viewport.is_empty() || !viewport.fits(target.0, target.1) {
        return Err(DrawError::InvalidViewport { viewport, target });
    }
    Ok(())
}

/// Checks that `geometry` feeds exactly the program's inputs with enough
/// vertices for the draw.
fn check_geometry(
    interface: &ProgramInterface,
    geometry: &GeometryObject,
    vertex_count: u32,
) -> Result<(), DrawError> {
    if let Some(binding) = geometry
        .bindings()
        .iter()
        .find(|b| interface.attribute_at(b.location()).is_none())
    {
        return Err(DrawError::ForeignBinding {
            geometry: geometry.label().to_owned(),
            location: binding.location(),
        });
    }

    if let Some(info) = interface
        .attributes()
        .iter()
        .find(|a| geometry.binding(a.location).is_none())
    {
        return Err(DrawError::MissingAttribute {
            geometry: geometry.label().to_owned(),
            attribute: info.name.clone(),
        });
    }

    let available = geometry.vertex_capacity();
    if vertex_count > available {
        return Err(DrawError::VertexRangeOutOfBounds {
            geometry: geometry.label().to_owned(),
            requested: vertex_count,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_call_draws_one_triangle() {
        let call = DrawCall::default();
        assert_eq!(call.vertex_count, 3);
        assert_eq!(call.primitive, PrimitiveKind::Triangles);
        assert_eq!(DrawCall::triangles(6).vertex_count, 6);
    }

    #[test]
    fn viewport_must_be_non_empty_and_inside_target() {
        assert!(check_viewport(Viewport::full(64, 64), (64, 64)).is_ok());
        assert_eq!(
            check_viewport(Viewport::full(0, 64), (64, 64)),
            Err(DrawError::InvalidViewport {
                viewport: Viewport::full(0, 64),
                target: (64, 64),
            })
        );
        assert!(check_viewport(Viewport::full(65, 64), (64, 64)).is_err());
    }

    #[test]
    fn fresh_driver_has_no_frame() {
        let driver = FrameDriver::new();
        assert_eq!(driver.viewport(), None);
        assert_eq!(driver.pipeline_count(), 0);
    }
}
