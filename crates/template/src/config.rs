//! Standard template configuration
//!
//! The standard template generates two snippets that shader files pull in
//! with `#include <version_header>` and `#include <thread_config>`.

use crate::{IncludeSource, Template};
use serde::{Deserialize, Serialize};

/// Default GLSL version directive
pub const VERSION_HEADER: &str = "#version 430";

/// Provider key of the version directive snippet
pub const VERSION_HEADER_KEY: &str = "version_header";

/// Provider key of the compute thread configuration snippet
pub const THREAD_CONFIG_KEY: &str = "thread_config";

/// Values substituted into the generated snippets
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directive emitted for `version_header`
    pub version_header: String,
    /// Invocations per compute work group
    pub thread_count: u32,
    /// Faces processed by each invocation
    pub faces_per_thread: u32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            version_header: VERSION_HEADER.to_string(),
            thread_count: 64,
            faces_per_thread: 1,
        }
    }
}

impl TemplateConfig {
    /// Parses a configuration from YAML content; missing keys take their defaults
    pub fn from_yaml(yaml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(yaml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from a YAML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.version_header.trim_start().starts_with("#version") {
            return Err(ConfigError::InvalidVersionHeader(self.version_header.clone()));
        }
        if self.thread_count == 0 {
            return Err(ConfigError::ZeroValue("thread_count"));
        }
        if self.faces_per_thread == 0 {
            return Err(ConfigError::ZeroValue("faces_per_thread"));
        }
        Ok(())
    }

    /// Text of the `version_header` snippet
    pub fn version_header_snippet(&self) -> String {
        format!("{}\n", self.version_header.trim_end())
    }

    /// Text of the `thread_config` snippet
    pub fn thread_config_snippet(&self) -> String {
        format!("#define THREAD_COUNT {}\n#define FACES_PER_THREAD {}\n", self.thread_count, self.faces_per_thread)
    }
}

/// Errors that can occur while loading a template configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read template config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse template config: {0}")]
    Parse(#[from] serde_norway::Error),
    #[error("version header '{0}' is not a #version directive")]
    InvalidVersionHeader(String),
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Builds the standard template
///
/// # Arguments
/// * `config` - Values for the generated `version_header` and `thread_config` snippets
/// * `include` - Tree the shader files are read from
///
/// # Returns
/// A template resolving the generated snippets first and `include` after them
pub fn standard_template(config: &TemplateConfig, include: impl IncludeSource + 'static) -> Template {
    let version_header = config.version_header_snippet();
    let thread_config = config.thread_config_snippet();

    let mut template = Template::new();
    template
        .add_snippet(VERSION_HEADER_KEY, version_header)
        .add_snippet(THREAD_CONFIG_KEY, thread_config)
        .add_include(include);
    template
}
