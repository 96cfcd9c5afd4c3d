//! Template expansion
//!
//! Expands `#include` directives into one flat source while recording, for
//! every emitted line, which file and line it came from.

use crate::IncludeSource;
use regex::Regex;
use shader_program::{LineOrigin, ProcessedSource, TemplateResolver};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

static INCLUDE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\s*#\s*include\s+(?:"([^"]+)"|<([^>]+)>)\s*(?://.*)?$"#).unwrap());
static PRAGMA_ONCE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#\s*pragma\s+once\s*(?://.*)?$").unwrap());

type SnippetProvider = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Errors raised while expanding a template
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No provider or include source knows the name
    #[error("cannot find '{name}'{}", .included_from.as_ref().map(|at| format!(" (included from {at})")).unwrap_or_default())]
    NotFound { name: String, included_from: Option<String> },
    /// A file includes itself, directly or indirectly
    #[error("include cycle: {}", .chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },
    /// Includes are nested deeper than the configured limit
    #[error("include depth limit of {limit} exceeded while including '{name}'")]
    TooDeep { name: String, limit: usize },
    /// An include source failed to read an existing file
    #[error("failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Include-expanding shader template
///
/// Names are looked up first in the snippet providers (verbatim, in
/// registration order) and then in the include sources (as normalized paths,
/// in registration order). Include names without a leading `/` are resolved
/// against the directory of the including file.
pub struct Template {
    providers: Vec<SnippetProvider>,
    sources: Vec<Box<dyn IncludeSource>>,
    max_depth: usize,
}

impl Template {
    /// Default limit on include nesting
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            sources: Vec::new(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Adds a provider of generated snippets
    ///
    /// The provider is asked for every looked up name and returns `None` for
    /// names it does not generate.
    pub fn add(&mut self, provider: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> &mut Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Adds a fixed snippet under `key`
    pub fn add_snippet(&mut self, key: &str, text: impl Into<String>) -> &mut Self {
        let key = key.to_string();
        let text = text.into();
        self.add(move |name| (name == key).then(|| text.clone()))
    }

    /// Adds a tree of includable files
    pub fn add_include(&mut self, source: impl IncludeSource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    /// Expands the named source
    pub fn load(&self, name: &str) -> Result<ProcessedSource, TemplateError> {
        let (key, text) = self.lookup(name, None)?.ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
            included_from: None,
        })?;

        let mut expansion = Expansion::new(self);
        expansion.enter(key, &text)?;
        debug!(name, lines = expansion.origins.len(), "expanded shader template");
        Ok(ProcessedSource::new(expansion.contents, expansion.origins))
    }

    /// Finds the text for `name`, returning the key it is recorded under
    fn lookup(&self, name: &str, includer: Option<&str>) -> Result<Option<(String, String)>, TemplateError> {
        if let Some(text) = self.providers.iter().find_map(|provider| provider(name)) {
            return Ok(Some((name.to_string(), text)));
        }

        let path = match includer {
            Some(includer) => resolve_include(includer, name),
            None => normalize_path(name),
        };
        let Some(path) = path else {
            return Ok(None);
        };

        for source in &self.sources {
            match source.read(&path) {
                Ok(Some(text)) => return Ok(Some((path, text))),
                Ok(None) => continue,
                Err(source) => return Err(TemplateError::Io { name: path, source }),
            }
        }
        Ok(None)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("providers", &self.providers.len())
            .field("sources", &self.sources.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl TemplateResolver for Template {
    type Error = TemplateError;

    fn load(&self, source_id: &str) -> Result<ProcessedSource, Self::Error> {
        Template::load(self, source_id)
    }
}

/// State of one `load` call
struct Expansion<'t> {
    template: &'t Template,
    contents: String,
    origins: Vec<LineOrigin>,
    /// Files that declared `#pragma once`
    once: HashSet<String>,
    /// Files currently being expanded, outermost first
    stack: Vec<String>,
}

impl<'t> Expansion<'t> {
    fn new(template: &'t Template) -> Self {
        Self {
            template,
            contents: String::new(),
            origins: Vec::new(),
            once: HashSet::new(),
            stack: Vec::new(),
        }
    }

    fn enter(&mut self, key: String, text: &str) -> Result<(), TemplateError> {
        if self.stack.contains(&key) {
            let mut chain = self.stack.clone();
            chain.push(key);
            return Err(TemplateError::IncludeCycle { chain });
        }
        if self.stack.len() >= self.template.max_depth {
            return Err(TemplateError::TooDeep {
                name: key,
                limit: self.template.max_depth,
            });
        }

        self.stack.push(key.clone());
        let file: Arc<str> = Arc::from(key.as_str());
        for (index, line) in text.lines().enumerate() {
            let line_number = index as u32 + 1;
            if PRAGMA_ONCE_REGEX.is_match(line) {
                self.once.insert(key.clone());
                continue;
            }
            if let Some(name) = include_target(line) {
                self.include(name, &key, line_number)?;
                continue;
            }
            self.contents.push_str(line);
            self.contents.push('\n');
            self.origins.push(LineOrigin {
                file: file.clone(),
                line: line_number,
            });
        }
        self.stack.pop();
        Ok(())
    }

    fn include(&mut self, name: &str, includer: &str, line: u32) -> Result<(), TemplateError> {
        let (key, text) = self.template.lookup(name, Some(includer))?.ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
            included_from: Some(format!("{includer}:{line}")),
        })?;

        if self.once.contains(&key) {
            trace!(name = %key, includer, "skipping include guarded by #pragma once");
            return Ok(());
        }
        trace!(name = %key, includer, line, "including");
        self.enter(key, &text)
    }
}

/// Returns the name of an `#include "name"` or `#include <name>` directive line
fn include_target(line: &str) -> Option<&str> {
    let captures = INCLUDE_REGEX.captures(line)?;
    captures.get(1).or_else(|| captures.get(2)).map(|name| name.as_str())
}

/// Resolves an include name against the file containing the directive
fn resolve_include(includer: &str, name: &str) -> Option<String> {
    if name.starts_with('/') {
        return normalize_path(name);
    }
    match includer.rfind('/') {
        Some(index) => normalize_path(&format!("{}/{}", &includer[..index], name)),
        None => normalize_path(name),
    }
}

/// Collapses `.`, `..` and repeated separators
///
/// Returns `None` for empty paths and for paths that climb above their root.
pub(crate) fn normalize_path(path: &str) -> Option<String> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        return None;
    }

    let joined = parts.join("/");
    Some(if path.starts_with('/') { format!("/{joined}") } else { joined })
}
