//! Small value types shared by the frame driver and hosts.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
