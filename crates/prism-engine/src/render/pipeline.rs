use std::collections::HashMap;

use crate::geometry::GeometryObject;
use crate::shader::{LinkedProgram, ProgramId};

/// Rasterized primitive kind for a draw call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

impl PrimitiveKind {
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Points => wgpu::PrimitiveTopology::PointList,
            Self::Lines => wgpu::PrimitiveTopology::LineList,
            Self::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Self::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// One vertex buffer slot as the pipeline sees it.
///
/// The byte offset is not part of it: offsets are applied when the buffer
/// slice is bound, so geometries that differ only in offset share a pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct SlotKey {
    location: u32,
    format: wgpu::VertexFormat,
    stride: u64,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    program: ProgramId,
    format: wgpu::TextureFormat,
    primitive: PrimitiveKind,
    slots: Vec<SlotKey>,
}

impl PipelineKey {
    pub(crate) fn new(
        program: &LinkedProgram,
        geometry: &GeometryObject,
        format: wgpu::TextureFormat,
        primitive: PrimitiveKind,
    ) -> Self {
        let slots = geometry
            .bindings()
            .iter()
            .map(|b| SlotKey {
                location: b.location(),
                format: b.layout().format(),
                stride: b.layout().stride(),
            })
            .collect();
        Self {
            program: program.id(),
            format,
            primitive,
            slots,
        }
    }
}

/// Render pipelines keyed by program, vertex layout, target format and primitive.
#[derive(Default)]
pub(crate) struct PipelineCache {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(crate) fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        program: &LinkedProgram,
        geometry: &GeometryObject,
        format: wgpu::TextureFormat,
        primitive: PrimitiveKind,
    ) -> &wgpu::RenderPipeline {
        let key = PipelineKey::new(program, geometry, format, primitive);
        self.pipelines.entry(key).or_insert_with(|| {
            log::debug!(
                "building pipeline for `{}` ({format:?}, {primitive:?})",
                geometry.label()
            );
            build_pipeline(device, program, geometry, format, primitive)
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.pipelines.len()
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    program: &LinkedProgram,
    geometry: &GeometryObject,
    format: wgpu::TextureFormat,
    primitive: PrimitiveKind,
) -> wgpu::RenderPipeline {
    let attributes: Vec<wgpu::VertexAttribute> = geometry
        .bindings()
        .iter()
        .map(|b| b.vertex_attribute())
        .collect();

    // One buffer slot per binding, in slot order.
    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = geometry
        .bindings()
        .iter()
        .zip(&attributes)
        .map(|(b, attr)| wgpu::VertexBufferLayout {
            array_stride: b.layout().stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: std::slice::from_ref(attr),
        })
        .collect();

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("prism program pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism program pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: program.vertex_module(),
            entry_point: Some(program.vertex_entry()),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: program.fragment_module(),
            entry_point: Some(program.fragment_entry()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // Fragments replace what is underneath.
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: primitive.topology(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
