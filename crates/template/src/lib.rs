//! Include-expanding GLSL templates
//!
//! Produces [`ProcessedSource`](shader_program::ProcessedSource) values for
//! the shader program compiler: shader files are expanded from include
//! sources and generated snippets, and every output line remembers the file
//! and line it was written in.

mod config;
mod include;
mod template;

pub use config::{ConfigError, THREAD_CONFIG_KEY, TemplateConfig, VERSION_HEADER, VERSION_HEADER_KEY, standard_template};
pub use include::{DirectorySource, IncludeSource, MemorySource};
pub use template::{Template, TemplateError};
