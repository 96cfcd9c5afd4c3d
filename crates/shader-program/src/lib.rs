//! Shader program building with source-accurate diagnostics
//!
//! This crate compiles a set of shader stages into one linked and validated
//! program object through a minimal driver interface, and rewrites the
//! driver's error logs so that line numbers point into the files a developer
//! authored rather than into the expanded source the driver was given.
//!
//! The template engine producing expanded sources and the driver binding are
//! supplied by the caller through the [`TemplateResolver`] and
//! [`ShaderDriver`] traits.

mod compiler;
mod descriptor;
mod diagnostics;
mod driver;
mod error;
mod manifest;
mod registry;
mod source;
mod stage;

#[cfg(test)]
mod mock;

pub use compiler::ProgramCompiler;
pub use descriptor::{ProgramDescriptor, ShaderUnit};
pub use diagnostics::remap_log;
pub use driver::{ProgramHandle, ShaderDriver, StageHandle};
pub use error::{BoxedResolverError, ProgramError};
pub use manifest::{ManifestError, ProgramManifest, ProgramSpec, StageSpec};
pub use registry::{
    COMPUTE_SOURCE, ProgramPresets, ProgramRegistry, RENDER_FRAGMENT_SOURCE, RENDER_VERTEX_SOURCE, UNORDERED_COMPUTE_SOURCE, WorkPartitioning,
};
pub use source::{LineOrigin, ProcessedSource, TemplateResolver};
pub use stage::{StageType, UnknownStageType};
