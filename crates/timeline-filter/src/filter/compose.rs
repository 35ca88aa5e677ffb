//! Composition of preset, file-sourced and ad-hoc filters into one query.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// The sources a composite query is built from.
///
/// [`FilterSet::compose`] joins, in order: the preset, each file fragment,
/// then the ad-hoc filter, with `and`. Presets and fragments are always
/// parenthesized; the ad-hoc filter is parenthesized only when something
/// precedes it.
///
/// # Example
///
/// ```
/// use timeline_filter::filter::FilterSet;
///
/// let query = FilterSet::new()
///     .with_fragment(r#"a == "1""#)
///     .with_filter(r#"b == "2""#)
///     .compose();
/// assert_eq!(query.as_deref(), Some(r#"(a == "1") and (b == "2")"#));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    preset: Option<String>,
    fragments: Vec<String>,
    filter: Option<String>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the named preset's query text.
    pub fn with_preset(mut self, query: impl Into<String>) -> Self {
        self.preset = Some(query.into());
        self
    }

    /// Adds a filter fragment. Blank fragments are ignored.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if !fragment.trim().is_empty() {
            self.fragments.push(fragment.trim().to_string());
        }
        self
    }

    /// Reads a whole file as one filter fragment.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn with_fragment_file(self, path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let fragment = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded filter fragment");
        Ok(self.with_fragment(fragment))
    }

    /// Sets the ad-hoc filter. A blank filter is treated as absent.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = (!filter.trim().is_empty()).then(|| filter.trim().to_string());
        self
    }

    /// Returns true if no source contributes to the query.
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && self.fragments.is_empty() && self.filter.is_none()
    }

    /// Builds the composite query, or `None` when there is nothing to filter on.
    pub fn compose(&self) -> Option<String> {
        let mut parts: Vec<String> = self
            .preset
            .iter()
            .chain(&self.fragments)
            .map(|part| format!("({part})"))
            .collect();

        if let Some(filter) = &self.filter {
            if parts.is_empty() {
                parts.push(filter.clone());
            } else {
                parts.push(format!("({filter})"));
            }
        }

        if parts.is_empty() {
            return None;
        }

        let query = parts.join(" and ");
        debug!(%query, "composed filter query");
        Some(query)
    }
}
