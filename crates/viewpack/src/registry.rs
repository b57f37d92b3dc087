//! View registry for the views collected during one compilation run
//!
//! The ViewRegistry is the single source of truth for which source a view
//! name maps to. Registration is last-writer-wins: registering a name again
//! replaces the entry and moves it to the end, so iteration order is the
//! order of each name's final registration.

use log::{debug, trace};
use once_cell::unsync::OnceCell;

use crate::{
    error::Result,
    template::{CompiledTemplate, TemplateEngine},
    types::{Attributes, FxIndexMap, ViewDefinition},
};

/// A registered view and its lazily compiled template
#[derive(Debug)]
pub struct ViewEntry {
    pub name: String,
    pub source: String,
    pub options: Attributes,
    template: OnceCell<Box<dyn CompiledTemplate>>,
}

impl ViewEntry {
    fn new(name: String, source: String, options: Attributes) -> Self {
        Self {
            name,
            source,
            options,
            template: OnceCell::new(),
        }
    }

    /// The compiled template, if it has been compiled yet.
    pub fn template(&self) -> Option<&dyn CompiledTemplate> {
        self.template.get().map(AsRef::as_ref)
    }

    /// Compile the source with `engine` on first call; later calls return the
    /// cached template without consulting the engine.
    pub fn ensure_template(&self, engine: &dyn TemplateEngine) -> Result<&dyn CompiledTemplate> {
        self.template
            .get_or_try_init(|| {
                trace!("Compiling template for view {}", self.name);
                engine.parse(&self.name, &self.source)
            })
            .map(AsRef::as_ref)
    }
}

/// Ordered, name-keyed collection of views
#[derive(Debug, Default)]
pub struct ViewRegistry {
    entries: FxIndexMap<String, ViewEntry>,
}

impl ViewRegistry {
    /// Create a new empty view registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every view in order.
    pub fn from_views(views: impl IntoIterator<Item = ViewDefinition>) -> Self {
        let mut registry = Self::new();
        for view in views {
            registry.register(view.name, view.source, view.options);
        }
        registry
    }

    /// Insert a view, replacing any entry with the same name.
    ///
    /// The returned entry has no compiled template yet.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        options: Attributes,
    ) -> &mut ViewEntry {
        let name = name.into();
        if self.entries.shift_remove(&name).is_some() {
            debug!("View {name} registered again; the later definition wins");
        }
        let entry = ViewEntry::new(name.clone(), source.into(), options);
        let (index, _) = self.entries.insert_full(name, entry);
        &mut self.entries[index]
    }

    pub fn get(&self, name: &str) -> Option<&ViewEntry> {
        self.entries.get(name)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ViewEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
