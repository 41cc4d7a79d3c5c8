//! Vertex data upload and attribute layout.
//!
//! Raw `f32` data is copied into static GPU buffers, and each program
//! attribute is described by a [`VertexLayoutBinding`] collected into a
//! [`GeometryObject`] that is drawn as a unit.

mod binder;
mod buffer;
mod error;
mod layout;
mod object;

pub use binder::GeometryBinder;
pub use buffer::VertexBuffer;
pub use error::BindError;
pub use layout::{VertexLayout, VertexLayoutBinding, FLOAT_SIZE};
pub use object::GeometryObject;
