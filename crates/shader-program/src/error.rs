//! Errors raised while building a shader program

use crate::StageType;

/// Boxed error reported by a template resolver
pub type BoxedResolverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reasons a program could not be built
///
/// By the time one of these is returned every driver object created for the
/// failed build has already been released. The messages of the driver-backed
/// variants are the driver's own log text (with only file/line tokens
/// rewritten for compile errors).
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The driver could not allocate a program object
    #[error("Unable to create shader program")]
    ProgramCreation,
    /// The driver could not allocate a stage object of the given type
    #[error("Unable to create shader of type {stage}")]
    StageCreation { stage: StageType },
    /// A stage failed to compile; `log` is already remapped to logical lines
    #[error("{log}")]
    StageCompile { stage: StageType, source_id: String, log: String },
    /// The stages compiled but could not be linked together
    #[error("{log}")]
    Link { log: String },
    /// The linked program is not usable in the current driver state
    #[error("{log}")]
    Validation { log: String },
    /// The template resolver failed to produce a source
    #[error("{source}")]
    Template { source_id: String, source: BoxedResolverError },
}

impl ProgramError {
    /// The stage this error is attributed to, if any
    pub fn stage(&self) -> Option<StageType> {
        match self {
            ProgramError::StageCreation { stage } | ProgramError::StageCompile { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The source identifier this error is attributed to, if any
    pub fn source_id(&self) -> Option<&str> {
        match self {
            ProgramError::StageCompile { source_id, .. } | ProgramError::Template { source_id, .. } => Some(source_id),
            _ => None,
        }
    }
}
