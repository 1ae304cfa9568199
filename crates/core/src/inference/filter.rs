//! Include/exclude filtering of field paths

use serde::{Deserialize, Serialize};

use super::path;

/// Field path filter applied while building a collection schema
///
/// An entry matches a path when the path equals it or lies underneath it.
/// When `include` is non-empty only matching paths (and the ancestors needed
/// to reach them) are kept. `exclude` is applied afterwards and always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    /// Paths to keep (empty = keep everything)
    #[serde(default)]
    pub include: Vec<String>,
    /// Paths to drop
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FieldFilter {
    /// Create a filter that keeps every path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter from include and exclude lists
    pub fn from_lists(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Add an included path
    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.include.push(path.into());
        self
    }

    /// Add an excluded path
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.exclude.push(path.into());
        self
    }

    /// Whether the filter keeps everything
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Check whether a field path survives the filter
    pub fn allows(&self, field_path: &str) -> bool {
        if !self.include.is_empty() {
            let included = self.include.iter().any(|entry| {
                path::is_within(field_path, entry) || path::is_within(entry, field_path)
            });
            if !included {
                return false;
            }
        }

        !self
            .exclude
            .iter()
            .any(|entry| path::is_within(field_path, entry))
    }
}
