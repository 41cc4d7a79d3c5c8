use anyhow::Result;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::render::FrameDriver;
use prism_engine::scene::TriangleScene;
use prism_engine::window::{Runtime, RuntimeConfig};

/// Shows the two-triangle scene until the window closes or Escape is hit.
#[derive(Default)]
struct Viewer {
    driver: FrameDriver,
    /// Built on the first frame, once the window's device exists.
    scene: Option<TriangleScene>,
}

impl App for Viewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.scene.is_none() {
            match TriangleScene::build(ctx.gpu.device()) {
                Ok(scene) => self.scene = Some(scene),
                Err(err) => {
                    log::error!("{err:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_ref() else {
            return AppControl::Exit;
        };

        let driver = &mut self.driver;
        ctx.render(|rctx, target| match scene.render(driver, rctx, target) {
            Ok(()) => AppControl::Continue,
            Err(err) => {
                log::error!("frame aborted: {err}");
                AppControl::Exit
            }
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "prism".to_string(),
        initial_size: LogicalSize::new(800.0, 800.0),
    };

    Runtime::run(config, GpuInit::default(), Viewer::default())
}
