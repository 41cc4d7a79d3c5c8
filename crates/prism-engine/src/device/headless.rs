use anyhow::{Context, Result};

use super::{HeadlessInit, OffscreenTarget, Rgba8};

/// GPU context rendering into an [`OffscreenTarget`] instead of a window.
///
/// Used by tests and tooling that need pixels back from the GPU.
pub struct HeadlessGpu {
    _instance: wgpu::Instance,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: OffscreenTarget,
}

/// Encoder for one offscreen frame.
pub struct HeadlessFrame {
    pub encoder: wgpu::CommandEncoder,
}

impl HeadlessGpu {
    /// Creates a windowless device and its colour target.
    ///
    /// A hardware adapter is tried first; a software adapter is used only when
    /// `allow_fallback_adapter` is set. No adapter at all is an error.
    pub async fn new(init: HeadlessInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = match request_adapter(&instance, false).await {
            Ok(adapter) => adapter,
            Err(err) if init.allow_fallback_adapter => {
                log::debug!("no hardware adapter ({err}); trying fallback adapter");
                request_adapter(&instance, true)
                    .await
                    .context("failed to find any GPU adapter")?
            }
            Err(err) => return Err(err).context("failed to find a suitable GPU adapter"),
        };

        log::info!("using headless adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism-engine headless device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let target = OffscreenTarget::new(&device, init.width, init.height, init.format)?;

        Ok(Self {
            _instance: instance,
            _adapter: adapter,
            device,
            queue,
            target,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    pub fn begin_frame(&self) -> HeadlessFrame {
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism headless frame encoder"),
            });
        HeadlessFrame { encoder }
    }

    pub fn submit(&self, frame: HeadlessFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
    }

    /// Reads the offscreen target back, waiting for submitted frames.
    pub fn read_pixels(&self) -> Result<Vec<Rgba8>> {
        self.target.read_pixels(&self.device, &self.queue)
    }
}

async fn request_adapter(
    instance: &wgpu::Instance,
    force_fallback_adapter: bool,
) -> std::result::Result<wgpu::Adapter, wgpu::RequestAdapterError> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter,
        })
        .await
}
