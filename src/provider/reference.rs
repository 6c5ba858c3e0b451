use std::fmt;

use super::{Provider, extras_then_defaults};

/// The foundational libraries: core runtime, networking primitives and
/// sequence operations.
pub const DEFAULT_REFERENCES: &[&str] = &["System.Runtime", "System.Net.Primitives", "System.Linq"];

/// A reference library identifier, resolved against a
/// [`ReferenceCatalog`](quickc_modules::ReferenceCatalog) at emit time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataReference {
    name: String,
}

impl MetadataReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MetadataReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for MetadataReference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MetadataReference {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReferenceProvider;

impl Provider<Vec<MetadataReference>> for DefaultReferenceProvider {
    fn provide(&self) -> Vec<MetadataReference> {
        DEFAULT_REFERENCES.iter().copied().map(MetadataReference::from).collect()
    }
}

/// The default references with caller-supplied extras in front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultWithAdditionalReferenceProvider {
    extras: Vec<MetadataReference>,
}

impl DefaultWithAdditionalReferenceProvider {
    pub fn new<I, R>(extras: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MetadataReference>,
    {
        Self {
            extras: extras.into_iter().map(Into::into).collect(),
        }
    }
}

impl Provider<Vec<MetadataReference>> for DefaultWithAdditionalReferenceProvider {
    fn provide(&self) -> Vec<MetadataReference> {
        extras_then_defaults(&self.extras, DefaultReferenceProvider.provide())
    }
}
