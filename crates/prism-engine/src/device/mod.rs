//! GPU device + render target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) for windowed hosts
//! - creating offscreen targets and reading them back for headless hosts
//! - acquiring frames and providing encoders/views for rendering

mod error;
mod frame;
mod gpu;
mod headless;
mod init;
mod offscreen;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use headless::{HeadlessFrame, HeadlessGpu};
pub use init::{GpuInit, HeadlessInit};
pub use offscreen::{OffscreenTarget, Rgba8};
