//! Shader stage kinds
//!
//! The closed set of programmable pipeline stages a program can be built from,
//! together with their conventional GL enum values and manifest names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageType {
    /// Per-vertex processing
    Vertex,
    /// Tessellation control (hull) stage
    TessControl,
    /// Tessellation evaluation (domain) stage
    TessEvaluation,
    /// Per-primitive processing
    Geometry,
    /// Per-fragment processing
    Fragment,
    /// General purpose compute
    Compute,
}

impl StageType {
    /// All stage kinds in pipeline order
    pub const ALL: [StageType; 6] = [
        StageType::Vertex,
        StageType::TessControl,
        StageType::TessEvaluation,
        StageType::Geometry,
        StageType::Fragment,
        StageType::Compute,
    ];

    /// Returns the name used in manifests and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            StageType::Vertex => "vertex",
            StageType::TessControl => "tess_control",
            StageType::TessEvaluation => "tess_evaluation",
            StageType::Geometry => "geometry",
            StageType::Fragment => "fragment",
            StageType::Compute => "compute",
        }
    }

    /// Returns the GL shader type enum for this stage
    pub fn gl_enum(&self) -> u32 {
        match self {
            StageType::Vertex => 0x8B31,
            StageType::TessControl => 0x8E88,
            StageType::TessEvaluation => 0x8E87,
            StageType::Geometry => 0x8DD9,
            StageType::Fragment => 0x8B30,
            StageType::Compute => 0x91B9,
        }
    }

    /// Looks up a stage from its GL shader type enum
    pub fn from_gl_enum(value: u32) -> Result<Self, UnknownStageType> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.gl_enum() == value)
            .ok_or_else(|| UnknownStageType(format!("{value:#06X}")))
    }

    /// Returns true for the stages that take part in the graphics pipeline
    pub fn is_graphics(&self) -> bool {
        !matches!(self, StageType::Compute)
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StageType {
    type Err = UnknownStageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "vertex" | "vert" => Ok(StageType::Vertex),
            "tess_control" | "tesc" => Ok(StageType::TessControl),
            "tess_evaluation" | "tese" => Ok(StageType::TessEvaluation),
            "geometry" | "geom" => Ok(StageType::Geometry),
            "fragment" | "frag" => Ok(StageType::Fragment),
            "compute" | "comp" => Ok(StageType::Compute),
            _ => Err(UnknownStageType(s.to_string())),
        }
    }
}

impl Serialize for StageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for StageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A stage name or GL enum that does not denote any known stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shader stage type '{0}'")]
pub struct UnknownStageType(pub String);
