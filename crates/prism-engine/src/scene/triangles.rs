use anyhow::{Context, Result};

use crate::coords::ColorRgba;
use crate::geometry::{GeometryBinder, GeometryObject, FLOAT_SIZE};
use crate::render::{DrawCall, DrawError, FrameDriver, RenderCtx, RenderTarget};
use crate::shader::{LinkedProgram, ShaderProgramBuilder, ShaderSource};

const VERTEX_SHADER: &str = include_str!("shaders/triangle.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/triangle.frag.wgsl");

/// Lower-right half of the screen: three `xyz` positions, then three `rgba`
/// colours.
#[rustfmt::skip]
pub const TRI1: [f32; 21] = [
    1.0, 1.0, 0.0,
    -1.0, -1.0, 0.0,
    1.0, -1.0, 0.0,
    0.0, 0.75, 0.0, 1.0,
    0.0, 0.75, 0.0, 1.0,
    0.0, 1.0, 0.0, 1.0,
];

/// Upper-left half of the screen, same packing as [`TRI1`].
#[rustfmt::skip]
pub const TRI2: [f32; 21] = [
    -1.0, 1.0, 0.0,
    -1.0, -1.0, 0.0,
    1.0, 1.0, 0.0,
    0.0, 0.5, 0.0, 1.0,
    0.0, 0.75, 0.0, 1.0,
    0.0, 0.75, 0.0, 1.0,
];

/// Byte offset of the first colour inside [`TRI1`]/[`TRI2`].
pub const COLOR_OFFSET_BYTES: u64 = 9 * FLOAT_SIZE;

/// Two shaded triangles covering the whole target, cleared to transparent.
pub struct TriangleScene {
    program: LinkedProgram,
    tri1: GeometryObject,
    tri2: GeometryObject,
    clear: ColorRgba,
}

impl TriangleScene {
    /// Compiles and links the triangle program, then uploads both triangles.
    ///
    /// Stops at the first failing step.
    pub fn build(device: &wgpu::Device) -> Result<Self> {
        let program = ShaderProgramBuilder::new()
            .vertex(ShaderSource::vertex(VERTEX_SHADER))
            .fragment(ShaderSource::fragment(FRAGMENT_SHADER))
            .build(device)
            .context("failed to build triangle program")?;

        let tri1 = prepare_triangle(device, &program, "tri1", &TRI1)?;
        let tri2 = prepare_triangle(device, &program, "tri2", &TRI2)?;

        log::info!(
            "triangle scene ready (position -> {:?}, color -> {:?})",
            program.resolve("position"),
            program.resolve("color")
        );

        Ok(Self {
            program,
            tri1,
            tri2,
            clear: ColorRgba::transparent(),
        })
    }

    pub fn program(&self) -> &LinkedProgram {
        &self.program
    }

    pub fn tri1(&self) -> &GeometryObject {
        &self.tri1
    }

    pub fn tri2(&self) -> &GeometryObject {
        &self.tri2
    }

    /// Records one full frame: clear, tri1, tri2.
    pub fn render(
        &self,
        driver: &mut FrameDriver,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), DrawError> {
        let (width, height) = (target.width, target.height);
        driver.init_frame(target, width, height, self.clear)?;
        driver.draw_geometry(ctx, target, &self.program, &self.tri1, DrawCall::default())?;
        driver.draw_geometry(ctx, target, &self.program, &self.tri2, DrawCall::default())?;
        driver.finish_frame();
        Ok(())
    }
}

fn prepare_triangle(
    device: &wgpu::Device,
    program: &LinkedProgram,
    label: &str,
    data: &[f32],
) -> Result<GeometryObject> {
    let binder = GeometryBinder::new(device, program);
    let mut geometry = GeometryObject::new(label);

    binder
        .prepare("position", 3, data, 0, 0, &mut geometry)
        .with_context(|| format!("failed to bind positions of {label}"))?;
    binder
        .prepare("color", 4, data, 0, COLOR_OFFSET_BYTES, &mut geometry)
        .with_context(|| format!("failed to bind colors of {label}"))?;

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{HeadlessGpu, HeadlessInit, Rgba8};
    use std::sync::Arc;

    use crate::geometry::{BindError, VertexBuffer};
    use crate::shader::{AttributeLocations, ShaderError};

    const SIZE: u32 = 64;

    /// A headless device, or `None` (test skipped) when the machine has no
    /// usable adapter.
    fn headless() -> Option<HeadlessGpu> {
        crate::logging::init_test_logging();
        let init = HeadlessInit {
            width: SIZE,
            height: SIZE,
            ..Default::default()
        };
        match pollster::block_on(HeadlessGpu::new(init)) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                eprintln!("skipping GPU test: {err:#}");
                None
            }
        }
    }

    fn render_with<F>(gpu: &HeadlessGpu, record: F) -> Vec<Rgba8>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let ctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.target().format());
        let mut frame = gpu.begin_frame();
        {
            let mut target =
                RenderTarget::new(&mut frame.encoder, gpu.target().view(), gpu.target().size());
            record(&ctx, &mut target);
        }
        gpu.submit(frame);
        gpu.read_pixels().unwrap()
    }

    /// Centre of pixel (`px`, `py`) in normalized device coordinates.
    fn pixel_ndc(px: u32, py: u32) -> (f32, f32) {
        let x = (px as f32 + 0.5) / SIZE as f32 * 2.0 - 1.0;
        let y = 1.0 - (py as f32 + 0.5) / SIZE as f32 * 2.0;
        (x, y)
    }

    /// Barycentric interpolation of a triangle's colours at (`x`, `y`), or
    /// `None` outside it.
    fn shade(tri: &[f32; 21], x: f32, y: f32) -> Option<[f32; 4]> {
        let p = |i: usize| (tri[i * 3], tri[i * 3 + 1]);
        let ((x0, y0), (x1, y1), (x2, y2)) = (p(0), p(1), p(2));

        let area = (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0);
        let w0 = ((x1 - x) * (y2 - y) - (x2 - x) * (y1 - y)) / area;
        let w1 = ((x2 - x) * (y0 - y) - (x0 - x) * (y2 - y)) / area;
        let w2 = 1.0 - w0 - w1;
        if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
            return None;
        }

        let c = |i: usize, ch: usize| tri[9 + i * 4 + ch];
        Some(std::array::from_fn(|ch| {
            w0 * c(0, ch) + w1 * c(1, ch) + w2 * c(2, ch)
        }))
    }

    fn assert_close(actual: Rgba8, expected: [f32; 4], px: u32, py: u32) {
        for ch in 0..4 {
            let want = (expected[ch] * 255.0).round() as i32;
            let got = actual[ch] as i32;
            assert!(
                (got - want).abs() <= 2,
                "pixel ({px}, {py}) channel {ch}: got {got}, want {want} ({actual:?})"
            );
        }
    }

    #[test]
    fn program_resolves_fixed_slots() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        assert_eq!(scene.program().resolve("position"), Some(0));
        assert_eq!(scene.program().resolve("color"), Some(1));
        assert_eq!(scene.program().resolve("Position"), None);
    }

    #[test]
    fn prepared_positions_fetch_input_triples() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let tri1 = scene.tri1();

        assert_eq!(tri1.fetch(0, 0), Some([1.0, 1.0, 0.0, 1.0]));
        assert_eq!(tri1.fetch(0, 1), Some([-1.0, -1.0, 0.0, 1.0]));
        assert_eq!(tri1.fetch(0, 2), Some([1.0, -1.0, 0.0, 1.0]));
        assert_eq!(tri1.fetch(1, 2), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(tri1.vertex_capacity(), 3);
    }

    #[test]
    fn each_attribute_reads_its_own_upload_of_the_data() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let tri2 = scene.tri2();

        let position = tri2.binding(0).unwrap();
        let color = tri2.binding(1).unwrap();
        assert_eq!(position.buffer().contents(), &TRI2[..]);
        assert_eq!(color.buffer().contents(), &TRI2[..]);
        assert_eq!(color.layout().offset(), COLOR_OFFSET_BYTES);
    }

    #[test]
    fn unknown_attribute_is_rejected_before_upload() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let binder = GeometryBinder::new(gpu.device(), scene.program());
        let mut geometry = GeometryObject::new("bad");

        let err = binder
            .prepare("normal", 3, &TRI1, 0, 0, &mut geometry)
            .unwrap_err();
        assert_eq!(
            err,
            BindError::UnresolvedAttribute {
                attribute: "normal".into()
            }
        );
        assert!(geometry.is_empty());
    }

    #[test]
    fn broken_shader_never_reaches_link() {
        let Some(gpu) = headless() else { return };
        let err = ShaderProgramBuilder::new()
            .vertex(ShaderSource::vertex("@vertex fn vs_main( -> {"))
            .fragment(ShaderSource::fragment(FRAGMENT_SHADER))
            .build(gpu.device())
            .unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
    }

    #[test]
    fn clear_only_frame_is_transparent() {
        let Some(gpu) = headless() else { return };
        let mut driver = FrameDriver::new();
        let pixels = render_with(&gpu, |_, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            driver.finish_frame();
        });
        assert!(pixels.iter().all(|p| *p == [0, 0, 0, 0]));
    }

    #[test]
    fn draws_two_triangles_with_interpolated_colours() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        let pixels = render_with(&gpu, |ctx, target| {
            scene.render(&mut driver, ctx, target).unwrap();
        });

        // Corners sit deep inside one triangle each.
        assert_close(pixels[0], shade(&TRI2, -1.0, 1.0).unwrap(), 0, 0);
        let last = (SIZE * SIZE - 1) as usize;
        assert_close(pixels[last], shade(&TRI1, 1.0, -1.0).unwrap(), SIZE - 1, SIZE - 1);

        for py in 0..SIZE {
            for px in 0..SIZE {
                let (x, y) = pixel_ndc(px, py);
                // The shared edge belongs to whichever triangle wins the
                // rasterization tie; skip it.
                if (x - y).abs() < 2.0 / SIZE as f32 {
                    continue;
                }
                let expected = shade(&TRI1, x, y)
                    .or_else(|| shade(&TRI2, x, y))
                    .unwrap();
                assert_close(pixels[(py * SIZE + px) as usize], expected, px, py);
            }
        }
    }

    #[test]
    fn single_triangle_leaves_the_rest_cleared() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        let pixels = render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            driver
                .draw_geometry(ctx, target, scene.program(), scene.tri1(), DrawCall::default())
                .unwrap();
            driver.finish_frame();
        });

        assert_eq!(pixels[0], [0, 0, 0, 0]);
        assert!(pixels[(SIZE * SIZE - 1) as usize][1] > 200);
    }

    #[test]
    fn pipelines_are_reused_across_geometries_and_frames() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        for _ in 0..2 {
            render_with(&gpu, |ctx, target| {
                scene.render(&mut driver, ctx, target).unwrap();
            });
        }
        assert_eq!(driver.pipeline_count(), 1);
    }

    #[test]
    fn draw_before_init_frame_fails() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        render_with(&gpu, |ctx, target| {
            let err = driver
                .draw_geometry(ctx, target, scene.program(), scene.tri1(), DrawCall::default())
                .unwrap_err();
            assert_eq!(err, DrawError::FrameNotInitialized);
        });
    }

    #[test]
    fn finished_frame_needs_init_again() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        render_with(&gpu, |ctx, target| {
            scene.render(&mut driver, ctx, target).unwrap();
            assert_eq!(driver.viewport(), None);
            let err = driver
                .draw_geometry(ctx, target, scene.program(), scene.tri2(), DrawCall::default())
                .unwrap_err();
            assert_eq!(err, DrawError::FrameNotInitialized);
        });
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let Some(gpu) = headless() else { return };
        let mut driver = FrameDriver::new();
        render_with(&gpu, |_, target| {
            let err = driver
                .init_frame(target, SIZE + 1, SIZE, ColorRgba::transparent())
                .unwrap_err();
            assert!(matches!(err, DrawError::InvalidViewport { .. }));
            assert_eq!(driver.viewport(), None);
        });
    }

    #[test]
    fn geometry_without_color_is_missing_an_attribute() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let binder = GeometryBinder::new(gpu.device(), scene.program());
        let mut positions_only = GeometryObject::new("positions only");
        binder
            .prepare("position", 3, &TRI1, 0, 0, &mut positions_only)
            .unwrap();

        let mut driver = FrameDriver::new();
        render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            let err = driver
                .draw_geometry(ctx, target, scene.program(), &positions_only, DrawCall::default())
                .unwrap_err();
            assert_eq!(
                err,
                DrawError::MissingAttribute {
                    geometry: "positions only".into(),
                    attribute: "color".into(),
                }
            );
        });
    }

    #[test]
    fn vertex_count_past_the_data_is_out_of_bounds() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let mut driver = FrameDriver::new();
        render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            let err = driver
                .draw_geometry(ctx, target, scene.program(), scene.tri1(), DrawCall::triangles(6))
                .unwrap_err();
            assert_eq!(
                err,
                DrawError::VertexRangeOutOfBounds {
                    geometry: "tri1".into(),
                    requested: 6,
                    available: 3,
                }
            );
        });
    }

    #[test]
    fn geometry_for_another_program_is_foreign() {
        const WEIGHTED_VS: &str = r#"
            struct VertexOut {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) vcolor: vec4<f32>,
            }

            @vertex
            fn vs_main(
                @location(0) position: vec3<f32>,
                @location(1) color: vec4<f32>,
                @location(2) weight: f32,
            ) -> VertexOut {
                var o: VertexOut;
                o.clip_position = vec4<f32>(position, 1.0);
                o.vcolor = color * weight;
                return o;
            }
        "#;

        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let weighted = ShaderProgramBuilder::new()
            .vertex(ShaderSource::vertex(WEIGHTED_VS))
            .fragment(ShaderSource::fragment(FRAGMENT_SHADER))
            .build(gpu.device())
            .unwrap();

        let mut geometry = prepare_triangle(gpu.device(), &weighted, "weighted", &TRI1).unwrap();
        GeometryBinder::new(gpu.device(), &weighted)
            .prepare("weight", 1, &[1.0, 1.0, 1.0], 0, 0, &mut geometry)
            .unwrap();

        let mut driver = FrameDriver::new();
        render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            let err = driver
                .draw_geometry(ctx, target, scene.program(), &geometry, DrawCall::default())
                .unwrap_err();
            assert_eq!(
                err,
                DrawError::ForeignBinding {
                    geometry: "weighted".into(),
                    location: 2,
                }
            );
        });
    }

    #[test]
    fn attributes_can_share_one_buffer_at_different_offsets() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let binder = GeometryBinder::new(gpu.device(), scene.program());
        let shared = Arc::new(VertexBuffer::upload(gpu.device(), "tri1 shared vbo", &TRI1));

        let mut geometry = GeometryObject::new("tri1 shared");
        binder
            .bind_buffer("position", 3, &shared, 0, 0, &mut geometry)
            .unwrap();
        binder
            .bind_buffer("color", 4, &shared, 0, COLOR_OFFSET_BYTES, &mut geometry)
            .unwrap();

        assert!(Arc::ptr_eq(geometry.binding(0).unwrap().buffer(), &shared));
        assert!(Arc::ptr_eq(geometry.binding(1).unwrap().buffer(), &shared));
        assert_eq!(geometry.fetch(1, 0), Some([0.0, 0.75, 0.0, 1.0]));

        let mut driver = FrameDriver::new();
        let pixels = render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            driver
                .draw_geometry(ctx, target, scene.program(), &geometry, DrawCall::default())
                .unwrap();
            driver.finish_frame();
        });

        assert_eq!(pixels[0], [0, 0, 0, 0]);
        let last = (SIZE * SIZE - 1) as usize;
        assert_close(pixels[last], shade(&TRI1, 1.0, -1.0).unwrap(), SIZE - 1, SIZE - 1);
    }

    #[test]
    fn empty_buffer_cannot_be_bound() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let binder = GeometryBinder::new(gpu.device(), scene.program());
        let empty = Arc::new(VertexBuffer::upload(gpu.device(), "empty vbo", &[]));
        let mut geometry = GeometryObject::new("empty");

        let err = binder
            .bind_buffer("position", 3, &empty, 0, 0, &mut geometry)
            .unwrap_err();
        assert_eq!(
            err,
            BindError::InsufficientData {
                attribute: "position".into(),
                needed_bytes: 12,
                available_bytes: 0,
            }
        );
        assert!(geometry.is_empty());
    }

    #[test]
    fn overlapping_stride_is_rejected_before_any_draw() {
        let Some(gpu) = headless() else { return };
        let scene = TriangleScene::build(gpu.device()).unwrap();
        let binder = GeometryBinder::new(gpu.device(), scene.program());
        let mut geometry = GeometryObject::new("overlapping");

        let err = binder
            .prepare("position", 3, &TRI1, 4, 0, &mut geometry)
            .unwrap_err();
        assert!(matches!(err, BindError::StrideTooSmall { stride: 4, .. }));
        assert!(geometry.is_empty());
    }

    #[test]
    fn builder_applies_a_custom_location_map() {
        const MOVED_VS: &str = r#"
            struct VertexOut {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) vcolor: vec4<f32>,
            }

            @vertex
            fn vs_main(
                @location(2) position: vec3<f32>,
                @location(5) color: vec4<f32>,
            ) -> VertexOut {
                var o: VertexOut;
                o.clip_position = vec4<f32>(position, 1.0);
                o.vcolor = color;
                return o;
            }
        "#;

        let Some(gpu) = headless() else { return };
        let builder = ShaderProgramBuilder::new()
            .locations(AttributeLocations::empty().bind("position", 2))
            .bind_attribute("color", 5)
            .vertex(ShaderSource::vertex(MOVED_VS))
            .fragment(ShaderSource::fragment(FRAGMENT_SHADER));

        let program = builder.build(gpu.device()).unwrap();
        assert_eq!(program.resolve("position"), Some(2));
        assert_eq!(program.resolve("color"), Some(5));

        let geometry = prepare_triangle(gpu.device(), &program, "moved", &TRI1).unwrap();
        let mut driver = FrameDriver::new();
        let pixels = render_with(&gpu, |ctx, target| {
            driver
                .init_frame(target, SIZE, SIZE, ColorRgba::transparent())
                .unwrap();
            driver
                .draw_geometry(ctx, target, &program, &geometry, DrawCall::default())
                .unwrap();
            driver.finish_frame();
        });
        let last = (SIZE * SIZE - 1) as usize;
        assert_close(pixels[last], shade(&TRI1, 1.0, -1.0).unwrap(), SIZE - 1, SIZE - 1);

        // The default map pins `color` to slot 1, which this shader does not use.
        let err = ShaderProgramBuilder::new()
            .vertex(ShaderSource::vertex(MOVED_VS))
            .fragment(ShaderSource::fragment(FRAGMENT_SHADER))
            .build(gpu.device())
            .unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }
}
