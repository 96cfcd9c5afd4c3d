//! Processed shader sources and the resolver interface that produces them

use std::sync::Arc;

/// Where one physical line of a processed source came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineOrigin {
    /// Logical file name as authored (or the snippet key for generated text)
    pub file: Arc<str>,
    /// 1-based line number within `file`
    pub line: u32,
}

impl LineOrigin {
    pub fn new(file: impl Into<Arc<str>>, line: u32) -> Self {
        Self { file: file.into(), line }
    }
}

/// Fully expanded source text plus its physical to logical line mapping
///
/// Physical lines are numbered from 1, matching the numbering drivers use in
/// their logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSource {
    contents: String,
    origins: Vec<LineOrigin>,
}

impl ProcessedSource {
    /// Creates a processed source from expanded text and one origin per physical line
    pub fn new(contents: String, origins: Vec<LineOrigin>) -> Self {
        Self { contents, origins }
    }

    /// Wraps text that was not expanded from anything: line `n` maps to `file:n`
    pub fn identity(file: &str, contents: impl Into<String>) -> Self {
        let contents = contents.into();
        let file: Arc<str> = Arc::from(file);
        let origins = (1..=contents.lines().count() as u32).map(|line| LineOrigin { file: file.clone(), line }).collect();
        Self { contents, origins }
    }

    /// The text submitted to the driver
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Looks up the origin of a 1-based physical line
    ///
    /// Returns `None` for line 0 and for lines past the end of the mapping.
    pub fn line_origin(&self, physical_line: u32) -> Option<&LineOrigin> {
        let index = physical_line.checked_sub(1)? as usize;
        self.origins.get(index)
    }

    /// All line origins in physical order
    pub fn origins(&self) -> &[LineOrigin] {
        &self.origins
    }
}

/// Turns logical source identifiers into processed sources
///
/// Implementations must be deterministic per identifier for a given
/// configuration. Their errors reach the caller of the compiler unchanged.
pub trait TemplateResolver {
    /// Error reported when an identifier cannot be resolved
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolves and expands the named source
    fn load(&self, source_id: &str) -> Result<ProcessedSource, Self::Error>;
}

impl<T: TemplateResolver + ?Sized> TemplateResolver for &T {
    type Error = T::Error;

    fn load(&self, source_id: &str) -> Result<ProcessedSource, Self::Error> {
        (**self).load(source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let source = ProcessedSource::identity("main.glsl", "a\nb\nc\n");
        assert_eq!(source.origins().len(), 3);
        assert_eq!(source.line_origin(2), Some(&LineOrigin::new("main.glsl", 2)));
    }

    #[test]
    fn test_line_lookup_out_of_range() {
        let source = ProcessedSource::identity("main.glsl", "only line");
        assert_eq!(source.line_origin(0), None);
        assert_eq!(source.line_origin(2), None);
        assert!(source.line_origin(1).is_some());
    }
}
