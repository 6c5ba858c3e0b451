//! The in-memory compiler: providers in, loaded module out.

use bumpalo::Bump;
use quickc_compiler::CompilationOptions;

use crate::assembler::CompilationAssembler;
use crate::emitter::ModuleEmitter;
use crate::error::CompileError;
use crate::module::LoadedModule;
use crate::provider::{
    CodeProvider, CompilationProvider, DefaultCompilationOptionProvider,
    DefaultWithAdditionalNamespaceProvider, DefaultWithAdditionalReferenceProvider,
    FixedModuleNameProvider, MetadataReference, Provider, RandomModuleNameProvider,
    SyntaxTreeProvider,
};

/// Caller adjustments to the default compilation policy.
///
/// Namespaces and references are added in front of the defaults. `options`
/// replaces the baseline options; its usings are still merged with the
/// namespace list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyOverrides {
    pub namespaces: Option<Vec<String>>,
    pub references: Option<Vec<MetadataReference>>,
    pub module_name: Option<String>,
    pub options: Option<CompilationOptions>,
}

impl PolicyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = Some(namespaces.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_references<I, R>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MetadataReference>,
    {
        self.references = Some(references.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn with_options(mut self, options: CompilationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Runs a compilation provider and emits what it provides.
#[derive(Debug, Clone, Copy)]
pub struct MemoryCompiler<'c> {
    emitter: ModuleEmitter<'c>,
}

impl<'c> MemoryCompiler<'c> {
    pub fn new(emitter: ModuleEmitter<'c>) -> Self {
        Self { emitter }
    }

    pub fn compile<'ast>(&self, provider: &impl CompilationProvider<'ast>) -> Result<LoadedModule, CompileError> {
        let compilation = provider.provide()?;
        Ok(self.emitter.emit(&compilation)?)
    }
}

impl Default for MemoryCompiler<'static> {
    fn default() -> Self {
        Self::new(ModuleEmitter::default())
    }
}

/// Source text plus policy overrides, wired to the default providers.
#[derive(Debug, Clone)]
pub struct DefaultMemoryCompiler {
    source: String,
    overrides: PolicyOverrides,
}

impl DefaultMemoryCompiler {
    pub fn new(source: impl Into<String>, overrides: Option<PolicyOverrides>) -> Self {
        Self {
            source: source.into(),
            overrides: overrides.unwrap_or_default(),
        }
    }

    pub fn compile(&self) -> Result<LoadedModule, CompileError> {
        self.compile_with(&MemoryCompiler::default())
    }

    pub fn compile_with(&self, compiler: &MemoryCompiler<'_>) -> Result<LoadedModule, CompileError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("DefaultMemoryCompiler::compile");

        let overrides = &self.overrides;
        let module_name: Box<dyn Provider<String>> = match &overrides.module_name {
            Some(name) => Box::new(FixedModuleNameProvider::new(name.clone())?),
            None => Box::new(RandomModuleNameProvider),
        };
        let namespaces =
            DefaultWithAdditionalNamespaceProvider::new(overrides.namespaces.clone().unwrap_or_default());
        let references =
            DefaultWithAdditionalReferenceProvider::new(overrides.references.clone().unwrap_or_default());
        let baseline = DefaultCompilationOptionProvider::new(namespaces.clone());
        let options = || match &overrides.options {
            Some(options) => {
                let mut options = options.clone();
                options.usings.extend(namespaces.provide());
                options
            }
            None => baseline.provide(),
        };

        let arena = Bump::new();
        let assembler = CompilationAssembler::new(
            SyntaxTreeProvider::new(CodeProvider::new(self.source.as_str()), &arena),
            || module_name.provide(),
            references,
            options,
        );
        compiler.compile(&assembler)
    }
}

/// Compile `source` into a loaded module under the default policy, adjusted
/// by `overrides`.
pub fn compile(source: &str, overrides: Option<PolicyOverrides>) -> Result<LoadedModule, CompileError> {
    DefaultMemoryCompiler::new(source, overrides).compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn overrides_apply_in_front_of_defaults() {
        let overrides = PolicyOverrides::new()
            .with_module_name("fixed_name")
            .with_references(["System.Linq"]);
        let module = compile("class A {}", Some(overrides)).unwrap();
        assert_eq!(module.name(), "fixed_name");
        assert_eq!(
            module.image().references,
            ["System.Linq", "System.Runtime", "System.Net.Primitives"]
        );
    }

    #[test]
    fn invalid_module_name_is_a_policy_error() {
        let overrides = PolicyOverrides::new().with_module_name("not a name");
        assert_eq!(
            compile("class A {}", Some(overrides)).unwrap_err(),
            CompileError::InvalidPolicy(ProviderError::InvalidModuleName {
                name: "not a name".to_string()
            })
        );
    }

    #[test]
    fn replaced_options_keep_the_namespace_usings() {
        let options = CompilationOptions::default().with_overflow_checks(false);
        let module = compile(
            "class A { public string M() => Path.Combine(\"a\", \"b\"); }",
            Some(PolicyOverrides::new().with_options(options)),
        )
        .unwrap();
        assert!(!module.image().flags.overflow_checks);
    }

    #[test]
    fn random_names_differ_between_compiles() {
        let first = compile("class A {}", None).unwrap();
        let second = compile("class A {}", None).unwrap();
        assert_ne!(first.name(), second.name());
    }
}
