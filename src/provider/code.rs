use super::Provider;

/// The caller's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeProvider {
    source: String,
}

impl CodeProvider {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Provider<String> for CodeProvider {
    fn provide(&self) -> String {
        self.source.clone()
    }
}
