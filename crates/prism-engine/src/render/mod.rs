//! Frame recording.
//!
//! A frame is one clear pass followed by one load pass per geometry draw, all
//! recorded into the caller's command encoder. Pipelines are built lazily and
//! cached across frames.

mod ctx;
mod driver;
mod error;
mod pipeline;

pub use ctx::{RenderCtx, RenderTarget};
pub use driver::{DrawCall, FrameDriver};
pub use error::DrawError;
pub use pipeline::PrimitiveKind;
