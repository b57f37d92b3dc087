//! Shared type definitions for the viewpack crate
//!
//! Views, imports and load results flow from the parser through the loader
//! into the registry; they live here so those stages do not depend on each
//! other for their data types.

use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Type alias for FxHasher-based IndexMap
pub type FxIndexMap<K, V> = IndexMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Type alias for FxHasher-based IndexSet
pub type FxIndexSet<T> = IndexSet<T, std::hash::BuildHasherDefault<FxHasher>>;

/// Attributes of a view tag, in source order.
///
/// Names are lower-cased; an attribute written without a value maps to `""`.
pub type Attributes = IndexMap<String, String>;

/// A named fragment of template source produced by the view parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    /// Colon-delimited name including any namespace prefix (e.g. `"nav:item"`)
    pub name: String,
    /// Raw body of the view tag
    pub source: String,
    /// Attributes of the view tag
    pub options: Attributes,
    /// Resolved file the view was declared in
    pub filename: PathBuf,
}

/// An `<import:>` tag after its `src` has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub filename: PathBuf,
    pub namespace: Option<String>,
}

/// Views and files collected by loading one file and everything it imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    /// Imported views first, then the file's own views
    pub views: Vec<ViewDefinition>,
    /// Every resolved file touched, imports before importers
    pub files: Vec<PathBuf>,
    /// SHA-256 (lower-case hex) of each entry of `files`, as read for this load
    pub digests: Vec<String>,
}

impl LoadResult {
    /// Append another result, keeping both orders.
    pub fn extend(&mut self, other: Self) {
        self.views.extend(other.views);
        self.files.extend(other.files);
        self.digests.extend(other.digests);
    }
}
