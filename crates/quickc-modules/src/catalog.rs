//! Lookup of reference libraries by identifier.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;

use crate::{Library, linq, net, runtime};

static STANDARD: LazyLock<ReferenceCatalog> = LazyLock::new(|| {
    let mut catalog = ReferenceCatalog::new();
    catalog.register(runtime::library());
    catalog.register(net::library());
    catalog.register(linq::library());
    catalog
});

/// The set of libraries a compilation may reference.
///
/// Libraries are shared: a loaded module keeps `Arc`s to the libraries its
/// native imports were bound against.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    libraries: FxHashMap<String, Arc<Library>>,
    order: Vec<String>,
}

impl ReferenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `System.Runtime`, `System.Net.Primitives` and `System.Linq`.
    pub fn standard() -> &'static ReferenceCatalog {
        &STANDARD
    }

    /// Add a library, replacing any previous library of the same name.
    pub fn register(&mut self, library: Library) -> &mut Self {
        let name = library.name().to_string();
        if self.libraries.insert(name.clone(), Arc::new(library)).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn with(mut self, library: Library) -> Self {
        self.register(library);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Library>> {
        self.libraries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    /// Library identifiers in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_the_three_foundational_libraries() {
        let catalog = ReferenceCatalog::standard();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["System.Runtime", "System.Net.Primitives", "System.Linq"]);
        assert!(catalog.get("System.Runtime").unwrap().provides_namespace("System.IO"));
        assert!(!catalog.contains("System.Drawing"));
    }

    #[test]
    fn re_registering_replaces_without_duplicating() {
        let mut catalog = ReferenceCatalog::new();
        catalog.register(Library::new("A")).register(Library::new("A"));
        assert_eq!(catalog.len(), 1);
    }
}
