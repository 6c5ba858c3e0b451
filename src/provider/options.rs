use quickc_compiler::CompilationOptions;

use super::Provider;

/// The baseline options: a library with checked arithmetic, release
/// optimization, and the namespace provider's list as global usings.
#[derive(Debug, Clone, Default)]
pub struct DefaultCompilationOptionProvider<N> {
    namespaces: N,
}

impl<N: Provider<Vec<String>>> DefaultCompilationOptionProvider<N> {
    pub fn new(namespaces: N) -> Self {
        Self { namespaces }
    }
}

impl<N: Provider<Vec<String>>> Provider<CompilationOptions> for DefaultCompilationOptionProvider<N> {
    fn provide(&self) -> CompilationOptions {
        CompilationOptions::default().with_usings(self.namespaces.provide())
    }
}
