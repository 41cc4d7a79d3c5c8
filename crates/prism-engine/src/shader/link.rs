use std::sync::atomic::{AtomicU64, Ordering};

use super::reflect::IoBinding;
use super::{CompiledShader, ShaderError, ShaderStage, ValueType};

// ── attribute locations ───────────────────────────────────────────────────

/// Fixed attribute name → slot map applied when a program is linked.
///
/// The default binds `position` to slot 0 and `color` to slot 1. Binding a
/// name twice keeps the last slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLocations {
    slots: Vec<(String, u32)>,
}

impl AttributeLocations {
    /// An empty map: every attribute keeps the slot its source declares.
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn bind(mut self, name: impl Into<String>, location: u32) -> Self {
        let name = name.into();
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = location,
            None => self.slots.push((name, location)),
        }
        self
    }

    pub fn location(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, location)| *location)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.slots.iter().map(|(n, l)| (n.as_str(), *l))
    }
}

impl Default for AttributeLocations {
    fn default() -> Self {
        Self::empty().bind("position", 0).bind("color", 1)
    }
}

// ── program interface ─────────────────────────────────────────────────────

/// A vertex input of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub location: u32,
    pub ty: ValueType,
}

/// Attribute table of a linked program, sorted by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInterface {
    attributes: Vec<AttributeInfo>,
}

impl ProgramInterface {
    /// Resolves an attribute name to its slot. Names are case-sensitive.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.attribute(name).map(|a| a.location)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_at(&self, location: u32) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.location == location)
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }
}

/// Links the interfaces of a vertex and a fragment stage.
///
/// Checks, in order:
/// - both shaders sit in the right slot (`StageMismatch` otherwise)
/// - every vertex input named in `locations` is declared at that slot
/// - the vertex stage writes `@builtin(position)`
/// - every fragment `@location` input is written by the vertex stage with the
///   same type
///
/// All link problems are gathered into one diagnostic.
pub fn link_interface(
    vertex: &CompiledShader,
    fragment: &CompiledShader,
    locations: &AttributeLocations,
) -> Result<ProgramInterface, ShaderError> {
    expect_stage(vertex, ShaderStage::Vertex)?;
    expect_stage(fragment, ShaderStage::Fragment)?;

    let vs = vertex.interface();
    let fs = fragment.interface();
    let mut problems = Vec::new();
    let mut attributes = Vec::new();

    for input in &vs.inputs {
        let (IoBinding::Location(declared), Some(name)) = (input.binding, input.name.as_deref())
        else {
            continue;
        };

        if let Some(bound) = locations.location(name) {
            if bound != declared {
                problems.push(format!(
                    "attribute `{name}` is declared at location {declared} but bound to location {bound}"
                ));
                continue;
            }
        }

        match input.ty {
            Some(ty) => attributes.push(AttributeInfo {
                name: name.to_owned(),
                location: declared,
                ty,
            }),
            None => problems.push(format!("attribute `{name}` has a non-numeric type")),
        }
    }

    for (name, location) in locations.iter() {
        if vs.inputs.iter().all(|v| v.name.as_deref() != Some(name)) {
            log::debug!("location {location} is bound to `{name}`, which the vertex stage does not read");
        }
    }

    if !vs.writes_position() {
        problems.push("vertex stage does not write @builtin(position)".to_owned());
    }

    for input in &fs.inputs {
        let IoBinding::Location(location) = input.binding else {
            continue;
        };
        let name = input.name.as_deref().unwrap_or("<unnamed>");

        match vs.output_at(location) {
            None => problems.push(format!(
                "fragment input `{name}` at location {location} is not written by the vertex stage"
            )),
            Some(out) if out.ty != input.ty => problems.push(format!(
                "fragment input `{name}` at location {location} expects {} but the vertex stage writes {}",
                describe(input.ty),
                describe(out.ty)
            )),
            Some(_) => {}
        }
    }

    if !problems.is_empty() {
        let diagnostic = problems.join("\n");
        log::error!("program failed to link:\n{diagnostic}");
        return Err(ShaderError::Link { diagnostic });
    }

    attributes.sort_by_key(|a| a.location);
    Ok(ProgramInterface { attributes })
}

fn expect_stage(shader: &CompiledShader, expected: ShaderStage) -> Result<(), ShaderError> {
    if shader.stage() == expected {
        return Ok(());
    }
    log::error!("expected a {expected} shader, got a {} shader", shader.stage());
    Err(ShaderError::StageMismatch {
        expected,
        found: shader.stage(),
    })
}

fn describe(ty: Option<ValueType>) -> String {
    ty.map_or_else(|| "a non-numeric type".to_owned(), |t| t.to_string())
}

// ── linked program ────────────────────────────────────────────────────────

/// Process-unique program identity, used to key render pipelines.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u64);

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Executable vertex + fragment program.
///
/// Owns the GPU shader modules and the attribute table. Never mutated after
/// link; the compiled stages may be dropped once this exists.
pub struct LinkedProgram {
    id: ProgramId,
    interface: ProgramInterface,
    vertex_module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_module: wgpu::ShaderModule,
    fragment_entry: String,
}

/// Links two compiled stages and creates their GPU modules.
///
/// GPU objects are only created once the interface link succeeds.
pub fn link_program(
    device: &wgpu::Device,
    vertex: &CompiledShader,
    fragment: &CompiledShader,
    locations: &AttributeLocations,
) -> Result<LinkedProgram, ShaderError> {
    let interface = link_interface(vertex, fragment, locations)?;
    let id = ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed));

    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("prism vertex shader"),
        source: wgpu::ShaderSource::Wgsl(vertex.source().to_owned().into()),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("prism fragment shader"),
        source: wgpu::ShaderSource::Wgsl(fragment.source().to_owned().into()),
    });

    log::debug!(
        "linked program {:?}: {}",
        id,
        interface
            .attributes()
            .iter()
            .map(|a| format!("{}@{}", a.name, a.location))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(LinkedProgram {
        id,
        interface,
        vertex_module,
        vertex_entry: vertex.entry_point().to_owned(),
        fragment_module,
        fragment_entry: fragment.entry_point().to_owned(),
    })
}

impl LinkedProgram {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    /// Resolves an attribute name to its slot.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.interface.resolve(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.interface.attribute(name)
    }

    pub(crate) fn vertex_module(&self) -> &wgpu::ShaderModule {
        &self.vertex_module
    }

    pub(crate) fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub(crate) fn fragment_module(&self) -> &wgpu::ShaderModule {
        &self.fragment_module
    }

    pub(crate) fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

impl std::fmt::Debug for LinkedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedProgram")
            .field("id", &self.id)
            .field("interface", &self.interface)
            .field("vertex_entry", &self.vertex_entry)
            .field("fragment_entry", &self.fragment_entry)
            .finish()
    }
}
