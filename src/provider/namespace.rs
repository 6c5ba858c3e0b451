use super::{Provider, extras_then_defaults};

/// Namespaces imported into every class by default.
pub const DEFAULT_NAMESPACES: &[&str] = &[
    "System",
    "System.IO",
    "System.Net",
    "System.Linq",
    "System.Text",
    "System.Text.RegularExpressions",
    "System.Collections.Generic",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamespaceProvider;

impl Provider<Vec<String>> for DefaultNamespaceProvider {
    fn provide(&self) -> Vec<String> {
        DEFAULT_NAMESPACES.iter().map(|ns| ns.to_string()).collect()
    }
}

/// The default namespaces with caller-supplied extras in front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultWithAdditionalNamespaceProvider {
    extras: Vec<String>,
}

impl DefaultWithAdditionalNamespaceProvider {
    pub fn new<I, S>(extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extras: extras.into_iter().map(Into::into).collect(),
        }
    }
}

impl Provider<Vec<String>> for DefaultWithAdditionalNamespaceProvider {
    fn provide(&self) -> Vec<String> {
        extras_then_defaults(&self.extras, DefaultNamespaceProvider.provide())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additions_extend_the_defaults() {
        let provider = DefaultWithAdditionalNamespaceProvider::new(["Samples", "System"]);
        let namespaces = provider.provide();
        assert_eq!(namespaces[..2], ["Samples", "System"]);
        assert_eq!(namespaces.len(), 2 + DEFAULT_NAMESPACES.len());
        assert!(DEFAULT_NAMESPACES.iter().all(|ns| namespaces.iter().any(|n| n == ns)));
    }

    #[test]
    fn providing_twice_does_not_accumulate() {
        let provider = DefaultWithAdditionalNamespaceProvider::new(["Samples"]);
        assert_eq!(provider.provide(), provider.provide());
    }
}
