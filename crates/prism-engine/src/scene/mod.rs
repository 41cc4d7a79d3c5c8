//! Built-in scenes.
//!
//! A scene owns a linked program and the geometry prepared for it, and knows
//! how to record itself into a frame.

mod triangles;

pub use triangles::{TriangleScene, COLOR_OFFSET_BYTES, TRI1, TRI2};
