//! Shader program building.
//!
//! WGSL sources are compiled and validated on the CPU with naga, their stage
//! interfaces are reflected, and the two stages are linked into a
//! [`LinkedProgram`] that owns the GPU shader modules.
//!
//! Attribute slots are fixed by an [`AttributeLocations`] map applied at link
//! time, so the name → slot table never depends on the backend.

mod builder;
mod compile;
mod error;
mod link;
mod reflect;
mod source;

pub use builder::ShaderProgramBuilder;
pub use compile::{compile_shader, CompiledShader};
pub use error::ShaderError;
pub use link::{link_interface, link_program, AttributeInfo, AttributeLocations, LinkedProgram, ProgramId, ProgramInterface};
pub use reflect::{InterfaceVar, IoBinding, ScalarKind, ValueType};
pub use source::{ShaderSource, ShaderStage};
