//! Configuration providers.
//!
//! Each compilation input comes from its own [`Provider`]: the source text,
//! the module name, the namespaces imported into every class, the reference
//! libraries and the compilation options. Providers are pure and repeatable,
//! with one exception: [`RandomModuleNameProvider`] yields a fresh name on
//! every call, so the assembler asks it exactly once per compile.
//!
//! Any `Fn() -> T` closure is a provider too.

mod code;
mod compilation;
mod module_name;
mod namespace;
mod options;
mod reference;
mod syntax_tree;

pub use code::CodeProvider;
pub use compilation::CompilationProvider;
pub use module_name::{FixedModuleNameProvider, RandomModuleNameProvider, is_valid_module_name};
pub use namespace::{
    DEFAULT_NAMESPACES, DefaultNamespaceProvider, DefaultWithAdditionalNamespaceProvider,
};
pub use options::DefaultCompilationOptionProvider;
pub use reference::{
    DEFAULT_REFERENCES, DefaultReferenceProvider, DefaultWithAdditionalReferenceProvider,
    MetadataReference,
};
pub use syntax_tree::{SyntaxTree, SyntaxTreeProvider};

/// Produces one compilation input.
pub trait Provider<T> {
    fn provide(&self) -> T;
}

impl<T, F> Provider<T> for F
where
    F: Fn() -> T,
{
    fn provide(&self) -> T {
        self()
    }
}

/// Extras first, then the defaults.
fn extras_then_defaults<T: Clone>(extras: &[T], defaults: impl IntoIterator<Item = T>) -> Vec<T> {
    extras.iter().cloned().chain(defaults).collect()
}
