use std::fmt;

use crate::coords::Viewport;

/// Failure while recording a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// `draw_geometry` was called before `init_frame`.
    FrameNotInitialized,
    /// The viewport is empty or extends past the colour target.
    InvalidViewport {
        viewport: Viewport,
        target: (u32, u32),
    },
    /// The geometry binds a slot the program does not read.
    ForeignBinding { geometry: String, location: u32 },
    /// The program reads an attribute the geometry does not bind.
    MissingAttribute { geometry: String, attribute: String },
    /// More vertices requested than every binding can feed.
    VertexRangeOutOfBounds {
        geometry: String,
        requested: u32,
        available: u32,
    },
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameNotInitialized => f.write_str("draw issued before the frame was initialized"),
            Self::InvalidViewport { viewport, target } => write!(
                f,
                "viewport {}x{} at ({}, {}) does not fit a {}x{} target",
                viewport.width, viewport.height, viewport.x, viewport.y, target.0, target.1
            ),
            Self::ForeignBinding { geometry, location } => write!(
                f,
                "geometry `{geometry}` binds slot {location}, which the program does not read"
            ),
            Self::MissingAttribute {
                geometry,
                attribute,
            } => write!(f, "geometry `{geometry}` does not bind attribute `{attribute}`"),
            Self::VertexRangeOutOfBounds {
                geometry,
                requested,
                available,
            } => write!(
                f,
                "geometry `{geometry}` can feed {available} vertices, {requested} requested"
            ),
        }
    }
}

impl std::error::Error for DrawError {}
