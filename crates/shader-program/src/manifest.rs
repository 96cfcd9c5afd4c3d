//! Program manifest parser
//!
//! A manifest is a YAML file listing named programs and their stages:
//!
//! ```yaml
//! programs:
//!   - name: render
//!     stages:
//!       - { type: vertex, source: /gpu/vert.glsl }
//!       - { type: fragment, source: /gpu/frag.glsl }
//! ```

use crate::{ProgramDescriptor, StageType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One stage entry of a manifest program
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StageSpec {
    /// Stage kind, e.g. `vertex` or `compute`
    #[serde(rename = "type")]
    pub stage: StageType,
    /// Logical source identifier passed to the template resolver
    pub source: String,
}

/// One named program of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stages: Vec<StageSpec>,
}

impl ProgramSpec {
    /// Builds the descriptor for this program, keeping stage order
    pub fn to_descriptor(&self) -> ProgramDescriptor {
        let mut descriptor = ProgramDescriptor::new();
        for stage in &self.stages {
            descriptor.append(stage.stage, stage.source.as_str());
        }
        descriptor
    }
}

/// Raw manifest as parsed from YAML
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramManifest {
    pub programs: Vec<ProgramSpec>,
}

impl ProgramManifest {
    /// Parses a manifest from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self, ManifestError> {
        Ok(serde_norway::from_str(yaml_content)?)
    }

    /// Parses a manifest from a YAML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Checks names and stage lists
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut names = HashSet::new();
        for (index, program) in self.programs.iter().enumerate() {
            if program.name.trim().is_empty() {
                return Err(ManifestError::EmptyName(index));
            }
            if !names.insert(program.name.as_str()) {
                return Err(ManifestError::DuplicateProgram(program.name.clone()));
            }
            if program.stages.is_empty() {
                return Err(ManifestError::NoStages(program.name.clone()));
            }
            if let Some(stage) = program.stages.iter().find(|stage| stage.source.trim().is_empty()) {
                return Err(ManifestError::EmptySource(program.name.clone(), stage.stage));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_norway::Error),
    /// Program at the given index has an empty name
    #[error("program {0} has an empty name")]
    EmptyName(usize),
    #[error("program '{0}' is declared more than once")]
    DuplicateProgram(String),
    #[error("program '{0}' declares no stages")]
    NoStages(String),
    #[error("program '{0}' has a {1} stage without a source")]
    EmptySource(String, StageType),
}
