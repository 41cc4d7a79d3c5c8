use super::{link_program, AttributeLocations, LinkedProgram, ShaderError, ShaderSource, ShaderStage};

/// Compiles a vertex/fragment pair and links it in one go.
///
/// ```rust,ignore
/// let program = ShaderProgramBuilder::new()
///     .vertex(ShaderSource::vertex(include_str!("tri.vert.wgsl")))
///     .fragment(ShaderSource::fragment(include_str!("tri.frag.wgsl")))
///     .build(device)?;
/// ```
///
/// The first failing step aborts the build: a shader that does not compile is
/// never handed to the linker.
#[derive(Debug, Clone, Default)]
pub struct ShaderProgramBuilder {
    locations: AttributeLocations,
    vertex: Option<ShaderSource>,
    fragment: Option<ShaderSource>,
}

impl ShaderProgramBuilder {
    /// Starts a builder with the default `position`/`color` slot map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the attribute slot map applied at link time.
    pub fn locations(mut self, locations: AttributeLocations) -> Self {
        self.locations = locations;
        self
    }

    /// Adds one fixed attribute slot.
    pub fn bind_attribute(mut self, name: impl Into<String>, location: u32) -> Self {
        self.locations = self.locations.bind(name, location);
        self
    }

    pub fn vertex(mut self, source: ShaderSource) -> Self {
        self.vertex = Some(source);
        self
    }

    pub fn fragment(mut self, source: ShaderSource) -> Self {
        self.fragment = Some(source);
        self
    }

    pub fn build(&self, device: &wgpu::Device) -> Result<LinkedProgram, ShaderError> {
        let vertex = self
            .vertex
            .as_ref()
            .ok_or(ShaderError::MissingStage {
                stage: ShaderStage::Vertex,
            })?
            .compile()?;
        let fragment = self
            .fragment
            .as_ref()
            .ok_or(ShaderError::MissingStage {
                stage: ShaderStage::Fragment,
            })?
            .compile()?;

        link_program(device, &vertex, &fragment, &self.locations)
    }
}
