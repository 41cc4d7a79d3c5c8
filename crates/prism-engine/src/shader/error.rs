use std::fmt;

use super::ShaderStage;

/// Failure while compiling or linking a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The compiler rejected the source; `diagnostic` is the compiler's report.
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },
    /// The source compiled but has no entry point for the requested stage.
    MissingEntryPoint { stage: ShaderStage },
    /// More than one entry point exists for the requested stage.
    AmbiguousEntryPoint {
        stage: ShaderStage,
        names: Vec<String>,
    },
    /// The program builder was not given a source for this stage.
    MissingStage { stage: ShaderStage },
    /// A compiled shader was passed in the wrong link slot.
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },
    /// The stages do not form a valid program.
    Link { diagnostic: String },
}

impl ShaderError {
    /// Compiler or linker report, when one exists.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Compile { diagnostic, .. } | Self::Link { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { stage, diagnostic } => {
                write!(f, "{stage} shader failed to compile:\n{diagnostic}")
            }
            Self::MissingEntryPoint { stage } => {
                write!(f, "shader source has no {stage} entry point")
            }
            Self::AmbiguousEntryPoint { stage, names } => write!(
                f,
                "shader source has several {stage} entry points: {}",
                names.join(", ")
            ),
            Self::MissingStage { stage } => write!(f, "no {stage} shader source given"),
            Self::StageMismatch { expected, found } => {
                write!(f, "expected a {expected} shader, got a {found} shader")
            }
            Self::Link { diagnostic } => write!(f, "program failed to link:\n{diagnostic}"),
        }
    }
}

impl std::error::Error for ShaderError {}
