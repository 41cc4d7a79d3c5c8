//! Prism engine crate.
//!
//! Compiles and links a WGSL vertex/fragment program, binds flat float vertex
//! data to its named attributes, and records frames that clear the target and
//! draw the prepared geometry. Runs in a winit window or headless.

pub mod coords;
pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod scene;
pub mod shader;
pub mod window;
