use super::VertexLayoutBinding;

/// A set of attribute bindings drawn as a unit (a "vertex array").
///
/// Holds references to vertex buffers, never the data itself. Each slot has at
/// most one binding; binding a slot again replaces the previous binding.
#[derive(Debug, Clone, Default)]
pub struct GeometryObject {
    label: String,
    bindings: Vec<VertexLayoutBinding>,
}

impl GeometryObject {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bindings: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bindings ordered by slot.
    pub fn bindings(&self) -> &[VertexLayoutBinding] {
        &self.bindings
    }

    pub fn binding(&self, location: u32) -> Option<&VertexLayoutBinding> {
        self.bindings.iter().find(|b| b.location() == location)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Largest vertex count every binding can feed; 0 when nothing is bound.
    pub fn vertex_capacity(&self) -> u32 {
        self.bindings
            .iter()
            .map(VertexLayoutBinding::available_vertices)
            .min()
            .unwrap_or(0)
    }

    /// What vertex `index` reads at `location`.
    pub fn fetch(&self, location: u32, index: u32) -> Option<[f32; 4]> {
        self.binding(location)?.fetch(index)
    }

    /// Inserts or replaces the binding for its slot, returning the old one.
    pub(crate) fn set_binding(&mut self, binding: VertexLayoutBinding) -> Option<VertexLayoutBinding> {
        let location = binding.location();
        match self.bindings.binary_search_by_key(&location, |b| b.location()) {
            Ok(i) => Some(std::mem::replace(&mut self.bindings[i], binding)),
            Err(i) => {
                self.bindings.insert(i, binding);
                None
            }
        }
    }
}
