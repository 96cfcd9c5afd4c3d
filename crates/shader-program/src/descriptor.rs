//! Program descriptors
//!
//! A descriptor is the declaration of which stages make up a program and where
//! their sources come from. It carries no GPU state and is safe to build long
//! before a driver context exists.

use crate::{ProgramCompiler, ProgramError, ProgramHandle, ShaderDriver, StageType, TemplateResolver};

/// One declared stage of a program
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderUnit {
    stage: StageType,
    source_id: String,
}

impl ShaderUnit {
    /// Creates a unit for the given stage and logical source identifier
    pub fn new(stage: StageType, source_id: impl Into<String>) -> Self {
        Self { stage, source_id: source_id.into() }
    }

    /// The stage this unit is compiled as
    pub fn stage(&self) -> StageType {
        self.stage
    }

    /// The logical source identifier handed to the template resolver
    pub fn source_id(&self) -> &str {
        &self.source_id
    }
}

/// Ordered list of shader units forming one program
///
/// Units are compiled and attached in declaration order. There is no way to
/// remove a unit once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramDescriptor {
    units: Vec<ShaderUnit>,
}

impl ProgramDescriptor {
    /// Creates an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage and returns this same descriptor for chaining
    ///
    /// # Example
    /// ```
    /// use shader_program::{ProgramDescriptor, StageType};
    ///
    /// let mut program = ProgramDescriptor::new();
    /// program.append(StageType::Vertex, "/gpu/vert.glsl").append(StageType::Fragment, "/gpu/frag.glsl");
    /// assert_eq!(program.len(), 2);
    /// ```
    pub fn append(&mut self, stage: StageType, source_id: impl Into<String>) -> &mut Self {
        self.units.push(ShaderUnit::new(stage, source_id));
        self
    }

    /// Consuming form of [`append`](Self::append) for building in expression position
    pub fn with_stage(mut self, stage: StageType, source_id: impl Into<String>) -> Self {
        self.append(stage, source_id);
        self
    }

    /// Iterates the units in declaration order
    pub fn units(&self) -> impl Iterator<Item = &ShaderUnit> {
        self.units.iter()
    }

    /// Number of declared units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no unit was declared
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compiles this descriptor with the given driver and template resolver
    ///
    /// Shorthand for [`ProgramCompiler::compile`] on a temporary compiler.
    pub fn compile<D, R>(&self, driver: &mut D, resolver: &R) -> Result<ProgramHandle, ProgramError>
    where
        D: ShaderDriver + ?Sized,
        R: TemplateResolver + ?Sized,
    {
        ProgramCompiler::new(driver).compile(self, resolver)
    }
}

impl<'a> IntoIterator for &'a ProgramDescriptor {
    type Item = &'a ShaderUnit;
    type IntoIter = std::slice::Iter<'a, ShaderUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_same_descriptor() {
        let mut descriptor = ProgramDescriptor::new();
        let original: *const ProgramDescriptor = &descriptor;

        let chained: *const ProgramDescriptor = descriptor.append(StageType::Vertex, "a.glsl").append(StageType::Fragment, "b.glsl");

        assert_eq!(original, chained);
        assert_eq!(descriptor.len(), 2);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let descriptor = ProgramDescriptor::new()
            .with_stage(StageType::Fragment, "frag.glsl")
            .with_stage(StageType::Vertex, "vert.glsl")
            .with_stage(StageType::Fragment, "frag.glsl");

        let stages: Vec<_> = descriptor.units().map(|unit| (unit.stage(), unit.source_id())).collect();
        assert_eq!(
            stages,
            vec![(StageType::Fragment, "frag.glsl"), (StageType::Vertex, "vert.glsl"), (StageType::Fragment, "frag.glsl")]
        );

        let mut iterated = Vec::new();
        for unit in &descriptor {
            iterated.push(unit.stage());
        }
        assert_eq!(iterated, vec![StageType::Fragment, StageType::Vertex, StageType::Fragment]);
    }

    #[test]
    fn test_empty_descriptor() {
        let descriptor = ProgramDescriptor::new();
        assert!(descriptor.is_empty());
        assert_eq!(descriptor.units().count(), 0);
    }
}
