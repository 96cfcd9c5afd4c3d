//! Named program registry
//!
//! The canonical programs are plain values built by the caller at startup and
//! passed around by reference, so the set of programs an application uses is
//! visible where it is composed.

use crate::{ManifestError, ProgramDescriptor, ProgramManifest, StageType};

/// Source of the standard vertex stage
pub const RENDER_VERTEX_SOURCE: &str = "/gpu/vert.glsl";
/// Source of the standard fragment stage
pub const RENDER_FRAGMENT_SOURCE: &str = "/gpu/frag.glsl";
/// Source of the compute stage with ordered work partitioning
pub const COMPUTE_SOURCE: &str = "/gpu/comp.glsl";
/// Source of the compute stage with unordered work partitioning
pub const UNORDERED_COMPUTE_SOURCE: &str = "/gpu/comp_unordered.glsl";

/// How the compute program partitions its work across invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkPartitioning {
    /// Each invocation processes a contiguous, ordered range of faces
    #[default]
    Ordered,
    /// Invocations pick work without ordering guarantees
    Unordered,
}

impl WorkPartitioning {
    /// Registry name of the compute program for this strategy
    pub fn program_name(&self) -> &'static str {
        match self {
            WorkPartitioning::Ordered => "compute",
            WorkPartitioning::Unordered => "compute_unordered",
        }
    }
}

/// The standard set of programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPresets {
    /// Vertex + fragment program used for rendering
    pub render: ProgramDescriptor,
    /// Compute program with ordered partitioning
    pub compute: ProgramDescriptor,
    /// Compute program with unordered partitioning
    pub unordered_compute: ProgramDescriptor,
}

impl ProgramPresets {
    /// Builds the standard presets
    pub fn standard() -> Self {
        Self {
            render: ProgramDescriptor::new()
                .with_stage(StageType::Vertex, RENDER_VERTEX_SOURCE)
                .with_stage(StageType::Fragment, RENDER_FRAGMENT_SOURCE),
            compute: ProgramDescriptor::new().with_stage(StageType::Compute, COMPUTE_SOURCE),
            unordered_compute: ProgramDescriptor::new().with_stage(StageType::Compute, UNORDERED_COMPUTE_SOURCE),
        }
    }

    /// Returns the compute program for a partitioning strategy
    pub fn compute(&self, partitioning: WorkPartitioning) -> &ProgramDescriptor {
        match partitioning {
            WorkPartitioning::Ordered => &self.compute,
            WorkPartitioning::Unordered => &self.unordered_compute,
        }
    }
}

impl Default for ProgramPresets {
    fn default() -> Self {
        Self::standard()
    }
}

/// Named program descriptors in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramRegistry {
    programs: Vec<(String, ProgramDescriptor)>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard presets under `render`, `compute` and `compute_unordered`
    pub fn standard() -> Self {
        Self::from(ProgramPresets::standard())
    }

    /// Builds a registry from a validated manifest
    pub fn from_manifest(manifest: &ProgramManifest) -> Result<Self, ManifestError> {
        manifest.validate()?;
        let mut registry = Self::new();
        for program in &manifest.programs {
            registry.insert(program.name.clone(), program.to_descriptor());
        }
        Ok(registry)
    }

    /// Parses and validates a YAML manifest
    pub fn from_yaml(yaml_content: &str) -> Result<Self, ManifestError> {
        Self::from_manifest(&ProgramManifest::from_yaml(yaml_content)?)
    }

    /// Loads and validates a YAML manifest file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ManifestError> {
        Self::from_manifest(&ProgramManifest::from_file(path)?)
    }

    /// Inserts or replaces a program, returning the previous descriptor
    ///
    /// A replaced program keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: ProgramDescriptor) -> Option<ProgramDescriptor> {
        let name = name.into();
        match self.programs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, descriptor)),
            None => {
                self.programs.push((name, descriptor));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProgramDescriptor> {
        self.programs.iter().find(|(existing, _)| existing == name).map(|(_, descriptor)| descriptor)
    }

    /// Iterates `(name, descriptor)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProgramDescriptor)> {
        self.programs.iter().map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl From<ProgramPresets> for ProgramRegistry {
    fn from(presets: ProgramPresets) -> Self {
        let mut registry = Self::new();
        registry.insert("render", presets.render);
        registry.insert(WorkPartitioning::Ordered.program_name(), presets.compute);
        registry.insert(WorkPartitioning::Unordered.program_name(), presets.unordered_compute);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryResolver, MockDriver};

    #[test]
    fn test_standard_presets() {
        let presets = ProgramPresets::standard();

        let render: Vec<_> = presets.render.units().map(|unit| (unit.stage(), unit.source_id())).collect();
        assert_eq!(render, vec![(StageType::Vertex, "/gpu/vert.glsl"), (StageType::Fragment, "/gpu/frag.glsl")]);

        let ordered = presets.compute(WorkPartitioning::Ordered).units().next().unwrap();
        assert_eq!(ordered.source_id(), "/gpu/comp.glsl");
        let unordered = presets.compute(WorkPartitioning::Unordered).units().next().unwrap();
        assert_eq!(unordered.source_id(), "/gpu/comp_unordered.glsl");
        assert_ne!(presets.compute(WorkPartitioning::Ordered), presets.compute(WorkPartitioning::Unordered));
    }

    #[test]
    fn test_standard_registry_order_and_lookup() {
        let registry = ProgramRegistry::standard();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["render", "compute", "compute_unordered"]);
        assert_eq!(registry.get("compute_unordered"), Some(&ProgramPresets::standard().unordered_compute));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut registry = ProgramRegistry::standard();
        let replacement = ProgramDescriptor::new().with_stage(StageType::Compute, "/gpu/other.glsl");
        let previous = registry.insert("render", replacement.clone());

        assert_eq!(previous, Some(ProgramPresets::standard().render));
        assert_eq!(registry.names().next(), Some("render"));
        assert_eq!(registry.get("render"), Some(&replacement));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_registry_from_yaml_rejects_invalid_manifest() {
        assert!(ProgramRegistry::from_yaml("programs:\n  - { name: a, stages: [] }\n").is_err());

        let registry = ProgramRegistry::from_yaml("programs:\n  - { name: a, stages: [{ type: compute, source: /gpu/comp.glsl }] }\n").unwrap();
        assert_eq!(registry.get("a"), Some(&ProgramPresets::standard().compute));
    }

    #[test]
    fn test_registry_programs_compile() {
        let resolver = MemoryResolver::new()
            .with_source(RENDER_VERTEX_SOURCE, "void main() {}\n")
            .with_source(RENDER_FRAGMENT_SOURCE, "void main() {}\n")
            .with_source(COMPUTE_SOURCE, "void main() {}\n")
            .with_source(UNORDERED_COMPUTE_SOURCE, "#error unordered variant disabled\n");
        let mut driver = MockDriver::new();

        let results: Vec<_> = ProgramRegistry::standard().iter().map(|(name, descriptor)| (name.to_string(), descriptor.compile(&mut driver, &resolver).is_ok())).collect();

        assert_eq!(
            results,
            vec![("render".to_string(), true), ("compute".to_string(), true), ("compute_unordered".to_string(), false)]
        );
        assert_eq!(driver.live_programs().len(), 2);
        assert_eq!(driver.live_stage_count(), 0);
    }
}
