use super::reflect::{reflect_entry_point, StageInterface};
use super::{ShaderError, ShaderSource, ShaderStage};

/// A shader stage that parsed, validated and has exactly one entry point of
/// its stage.
///
/// Only produced by [`compile_shader`]; a failed compile never yields one, so
/// it cannot reach the link step.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    stage: ShaderStage,
    entry_point: String,
    source: String,
    interface: StageInterface,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn interface(&self) -> &StageInterface {
        &self.interface
    }
}

impl ShaderSource {
    /// Compiles this source for its stage.
    pub fn compile(&self) -> Result<CompiledShader, ShaderError> {
        compile_shader(self.stage(), self.text())
    }
}

/// Compiles WGSL `source` as a `stage` shader.
///
/// Failures are logged with the compiler diagnostic and returned; nothing
/// panics and nothing is retried.
pub fn compile_shader(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|err| compile_failure(stage, err.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|err| compile_failure(stage, err.emit_to_string(source)))?;

    let mut candidates = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga());

    let Some(ep) = candidates.next() else {
        log::error!("{stage} shader has no {stage} entry point");
        return Err(ShaderError::MissingEntryPoint { stage });
    };

    if candidates.next().is_some() {
        let names: Vec<String> = module
            .entry_points
            .iter()
            .filter(|ep| ep.stage == stage.to_naga())
            .map(|ep| ep.name.clone())
            .collect();
        log::error!("{stage} shader has several entry points: {}", names.join(", "));
        return Err(ShaderError::AmbiguousEntryPoint { stage, names });
    }

    let interface = reflect_entry_point(&module, ep);
    log::debug!(
        "compiled {stage} shader `{}` ({} inputs, {} outputs)",
        ep.name,
        interface.inputs.len(),
        interface.outputs.len()
    );

    Ok(CompiledShader {
        stage,
        entry_point: ep.name.clone(),
        source: source.to_owned(),
        interface,
    })
}

fn compile_failure(stage: ShaderStage, diagnostic: String) -> ShaderError {
    log::error!("{stage} shader failed to compile:\n{diagnostic}");
    ShaderError::Compile { stage, diagnostic }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ValueType;

    const VS: &str = r#"
        struct VsOut {
            @builtin(position) clip: vec4<f32>,
            @location(0) vcolor: vec4<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
            var o: VsOut;
            o.clip = vec4<f32>(position, 1.0);
            o.vcolor = color;
            return o;
        }
    "#;

    #[test]
    fn valid_vertex_source_compiles() {
        let shader = compile_shader(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert_eq!(shader.entry_point(), "vs_main");
        assert_eq!(
            shader.interface().input_at(1).unwrap().ty,
            Some(ValueType::float(4))
        );
    }

    #[test]
    fn syntax_error_reports_diagnostic() {
        crate::logging::init_test_logging();
        let err = compile_shader(ShaderStage::Vertex, "@vertex fn vs_main( -> {").unwrap_err();
        match &err {
            ShaderError::Compile { stage, diagnostic } => {
                assert_eq!(*stage, ShaderStage::Vertex);
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.diagnostic().is_some());
    }

    #[test]
    fn type_error_is_a_compile_failure() {
        let src = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                let x: f32 = vec2<f32>(1.0, 2.0);
                return vec4<f32>(x);
            }
        "#;
        let err = compile_shader(ShaderStage::Fragment, src).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
    }

    #[test]
    fn wrong_stage_has_no_entry_point() {
        let err = compile_shader(ShaderStage::Fragment, VS).unwrap_err();
        assert_eq!(
            err,
            ShaderError::MissingEntryPoint {
                stage: ShaderStage::Fragment
            }
        );
    }

    #[test]
    fn two_entry_points_of_one_stage_are_ambiguous() {
        let src = r#"
            @fragment fn a() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }
            @fragment fn b() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
        "#;
        let err = compile_shader(ShaderStage::Fragment, src).unwrap_err();
        assert_eq!(
            err,
            ShaderError::AmbiguousEntryPoint {
                stage: ShaderStage::Fragment,
                names: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn source_wrapper_compiles_for_its_stage() {
        let shader = ShaderSource::vertex(VS).compile().unwrap();
        assert_eq!(shader.stage(), ShaderStage::Vertex);
    }
}
