use std::fmt;

use crate::shader::ValueType;

/// Failure while binding vertex data to a program attribute.
///
/// Nothing is uploaded or bound when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The program has no vertex input with this name.
    UnresolvedAttribute { attribute: String },
    /// Component count outside `1..=4`.
    InvalidComponentCount { attribute: String, components: u8 },
    /// Stride is not a multiple of 4 bytes.
    MisalignedStride { attribute: String, stride: u64 },
    /// Byte offset is not a multiple of 4 bytes.
    MisalignedOffset { attribute: String, offset: u64 },
    /// Non-zero stride shorter than one element, so vertices would overlap.
    StrideTooSmall {
        attribute: String,
        stride: u64,
        element_size: u64,
    },
    /// Stride exceeds the device's `max_vertex_buffer_array_stride`.
    StrideTooLarge { attribute: String, stride: u64, max: u64 },
    /// The data does not hold even one vertex at the given offset.
    InsufficientData {
        attribute: String,
        needed_bytes: u64,
        available_bytes: u64,
    },
    /// The shader input cannot be fed with this many float components.
    TypeMismatch {
        attribute: String,
        shader_type: ValueType,
        components: u8,
    },
    /// The geometry already uses every vertex buffer slot the device offers.
    TooManyBindings { max: u32 },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedAttribute { attribute } => {
                write!(f, "program has no attribute named `{attribute}`")
            }
            Self::InvalidComponentCount {
                attribute,
                components,
            } => write!(
                f,
                "attribute `{attribute}`: component count {components} is outside 1..=4"
            ),
            Self::MisalignedStride { attribute, stride } => write!(
                f,
                "attribute `{attribute}`: stride {stride} is not a multiple of 4 bytes"
            ),
            Self::MisalignedOffset { attribute, offset } => write!(
                f,
                "attribute `{attribute}`: offset {offset} is not a multiple of 4 bytes"
            ),
            Self::StrideTooSmall {
                attribute,
                stride,
                element_size,
            } => write!(
                f,
                "attribute `{attribute}`: stride {stride} is shorter than one {element_size}-byte element"
            ),
            Self::StrideTooLarge {
                attribute,
                stride,
                max,
            } => write!(
                f,
                "attribute `{attribute}`: stride {stride} exceeds the device limit of {max}"
            ),
            Self::InsufficientData {
                attribute,
                needed_bytes,
                available_bytes,
            } => write!(
                f,
                "attribute `{attribute}`: one vertex needs {needed_bytes} bytes, data has {available_bytes}"
            ),
            Self::TypeMismatch {
                attribute,
                shader_type,
                components,
            } => write!(
                f,
                "attribute `{attribute}` is {shader_type} in the shader and cannot take {components} float components"
            ),
            Self::TooManyBindings { max } => {
                write!(f, "geometry already binds the maximum of {max} vertex buffers")
            }
        }
    }
}

impl std::error::Error for BindError {}
