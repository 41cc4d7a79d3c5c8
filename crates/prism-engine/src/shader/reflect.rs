//! Stage interface reflection over naga IR.

use std::fmt;

/// Scalar element kind of a stage input/output.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
    Bool,
}

/// Numeric type of a stage input/output: a scalar or a vector of 2 to 4 components.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ValueType {
    pub kind: ScalarKind,
    pub components: u8,
}

impl ValueType {
    pub const fn float(components: u8) -> Self {
        Self {
            kind: ScalarKind::Float,
            components,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scalar = match self.kind {
            ScalarKind::Float => "f32",
            ScalarKind::Sint => "i32",
            ScalarKind::Uint => "u32",
            ScalarKind::Bool => "bool",
        };
        if self.components == 1 {
            f.write_str(scalar)
        } else {
            write!(f, "vec{}<{scalar}>", self.components)
        }
    }
}

/// Where an interface variable is bound.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IoBinding {
    /// User-defined `@location(n)`.
    Location(u32),
    /// `@builtin(position)`.
    Position,
    /// Any other builtin (`vertex_index`, `front_facing`, ...).
    OtherBuiltIn,
}

/// One input or output of an entry point, with nested structs flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVar {
    pub name: Option<String>,
    pub binding: IoBinding,
    /// `None` for types that are not numeric scalars/vectors.
    pub ty: Option<ValueType>,
}

impl InterfaceVar {
    pub fn location(&self) -> Option<u32> {
        match self.binding {
            IoBinding::Location(location) => Some(location),
            _ => None,
        }
    }
}

/// Inputs and outputs of one entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
}

impl StageInterface {
    pub fn input_at(&self, location: u32) -> Option<&InterfaceVar> {
        self.inputs.iter().find(|v| v.location() == Some(location))
    }

    pub fn output_at(&self, location: u32) -> Option<&InterfaceVar> {
        self.outputs.iter().find(|v| v.location() == Some(location))
    }

    pub fn writes_position(&self) -> bool {
        self.outputs.iter().any(|v| v.binding == IoBinding::Position)
    }
}

pub(crate) fn reflect_entry_point(module: &naga::Module, ep: &naga::EntryPoint) -> StageInterface {
    let mut interface = StageInterface::default();

    for arg in &ep.function.arguments {
        collect(
            module,
            arg.name.as_deref(),
            arg.ty,
            arg.binding.as_ref(),
            &mut interface.inputs,
        );
    }

    if let Some(result) = &ep.function.result {
        collect(module, None, result.ty, result.binding.as_ref(), &mut interface.outputs);
    }

    interface
}

fn collect(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(binding) => out.push(InterfaceVar {
            name: name.map(str::to_owned),
            binding: map_binding(binding),
            ty: value_type(module, ty),
        }),
        // Unbound arguments/results are structs whose members carry bindings.
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(binding) = &member.binding {
                        out.push(InterfaceVar {
                            name: member.name.clone(),
                            binding: map_binding(binding),
                            ty: value_type(module, member.ty),
                        });
                    }
                }
            }
        }
    }
}

fn map_binding(binding: &naga::Binding) -> IoBinding {
    match binding {
        naga::Binding::Location { location, .. } => IoBinding::Location(*location),
        naga::Binding::BuiltIn(naga::BuiltIn::Position { .. }) => IoBinding::Position,
        naga::Binding::BuiltIn(_) => IoBinding::OtherBuiltIn,
    }
}

fn value_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Option<ValueType> {
    let (scalar, components) = match module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) => (scalar, 1),
        naga::TypeInner::Vector { size, scalar } => (scalar, size as u8),
        _ => return None,
    };

    let kind = match scalar.kind {
        naga::ScalarKind::Float => ScalarKind::Float,
        naga::ScalarKind::Sint => ScalarKind::Sint,
        naga::ScalarKind::Uint => ScalarKind::Uint,
        naga::ScalarKind::Bool => ScalarKind::Bool,
        _ => return None,
    };

    Some(ValueType { kind, components })
}
