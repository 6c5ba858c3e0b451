//! The module emitter.
//!
//! [`ModuleEmitter::emit`] generates a module image for a [`Compilation`]
//! into an in-memory buffer, then loads it. Blocking diagnostics stop the
//! emit before anything is loaded; each one is also logged through
//! `tracing`.

use std::io::Cursor;
use std::sync::Arc;

use quickc_compiler::{Compiler, write_image};
use quickc_core::{CompilationError, Diagnostic, Diagnostics, Span};
use quickc_modules::{Library, ReferenceCatalog};
use rustc_hash::FxHashSet;

use crate::assembler::Compilation;
use crate::error::{EmitFailure, LoadError};
use crate::module::LoadedModule;

/// Code of the diagnostic reported when a generated image fails to load.
pub const LOAD_FAILURE: &str = "QC9001";

#[derive(Debug, Clone, Copy)]
pub struct ModuleEmitter<'c> {
    catalog: &'c ReferenceCatalog,
}

impl<'c> ModuleEmitter<'c> {
    pub fn new(catalog: &'c ReferenceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c ReferenceCatalog {
        self.catalog
    }

    pub fn emit(&self, compilation: &Compilation<'_>) -> Result<LoadedModule, EmitFailure> {
        #[cfg(feature = "profiling")]
        profiling::scope!("ModuleEmitter::emit");

        let mut buffer = Cursor::new(Vec::new());
        let diagnostics = self.generate(compilation, &mut buffer);
        report(&diagnostics);
        if diagnostics.has_blocking() {
            return Err(EmitFailure { diagnostics });
        }

        buffer.set_position(0);
        let module = LoadedModule::load(buffer, self.catalog).map_err(|err| load_failure(&err))?;
        tracing::debug!(module = %module.name(), warnings = diagnostics.len(), "emitted module");
        Ok(module.with_warnings(diagnostics))
    }

    /// Generate the image into `buffer`. Nothing is written when a
    /// diagnostic blocks.
    fn generate(&self, compilation: &Compilation<'_>, buffer: &mut Cursor<Vec<u8>>) -> Diagnostics {
        let mut diagnostics = compilation.syntax_tree().diagnostics().clone();
        if diagnostics.has_blocking() {
            return diagnostics;
        }

        let references = self.resolve_references(compilation, &mut diagnostics);
        let output = Compiler::new(compilation.module_name(), compilation.options().clone())
            .with_references(references)
            .compile(compilation.syntax_tree().script());
        diagnostics.extend(output.diagnostics);

        match output.image {
            Some(image) if !diagnostics.has_blocking() => {
                if let Err(err) = write_image(&image, buffer) {
                    diagnostics.push(Diagnostic::error(LOAD_FAILURE, err.to_string(), Span::default()));
                }
            }
            _ => {}
        }
        diagnostics
    }

    fn resolve_references(
        &self,
        compilation: &Compilation<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Arc<Library>> {
        let mut seen = FxHashSet::default();
        let mut libraries = Vec::new();
        for reference in compilation.references() {
            if !seen.insert(reference.name()) {
                continue;
            }
            match self.catalog.get(reference.name()) {
                Some(library) => libraries.push(Arc::clone(library)),
                None => diagnostics.push(Diagnostic::from(CompilationError::MissingReference {
                    name: reference.name().to_string(),
                    span: Span::default(),
                })),
            }
        }
        libraries
    }
}

impl Default for ModuleEmitter<'static> {
    fn default() -> Self {
        Self::new(ReferenceCatalog::standard())
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let (code, line, col) = (diagnostic.code, diagnostic.span.line, diagnostic.span.col);
        if diagnostic.is_blocking() {
            tracing::error!(code, line, col, "{}", diagnostic.message);
        } else {
            tracing::warn!(code, line, col, "{}", diagnostic.message);
        }
    }
}

fn load_failure(err: &LoadError) -> EmitFailure {
    tracing::error!(code = LOAD_FAILURE, error = %err, "module failed to load");
    EmitFailure {
        diagnostics: std::iter::once(Diagnostic::error(LOAD_FAILURE, err.to_string(), Span::default()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use quickc_compiler::CompilationOptions;

    use super::*;
    use crate::provider::{
        DEFAULT_NAMESPACES, DEFAULT_REFERENCES, MetadataReference, SyntaxTree,
    };

    fn compilation<'a>(source: &str, references: &[&str], arena: &'a Bump) -> Compilation<'a> {
        Compilation::new(
            "emitter_test".to_string(),
            SyntaxTree::parse(source, arena).unwrap(),
            references.iter().copied().map(MetadataReference::from).collect(),
            CompilationOptions::default().with_usings(DEFAULT_NAMESPACES.iter().copied()),
        )
    }

    #[test]
    fn emits_a_loadable_module() {
        let arena = Bump::new();
        let compilation = compilation(
            "class A { public int M() => Math.Abs(-2); }",
            DEFAULT_REFERENCES,
            &arena,
        );
        let module = ModuleEmitter::default().emit(&compilation).unwrap();
        assert_eq!(module.name(), "emitter_test");
        assert!(module.warnings().is_empty());
        assert_eq!(module.image().references, DEFAULT_REFERENCES);
    }

    #[test]
    fn unknown_reference_blocks() {
        let arena = Bump::new();
        let compilation = compilation("class A {}", &["System.Runtime", "No.Such.Library"], &arena);
        let failure = ModuleEmitter::default().emit(&compilation).unwrap_err();
        assert!(failure.contains_code("QC0006"));
    }

    #[test]
    fn duplicate_references_are_bound_once() {
        let arena = Bump::new();
        let compilation = compilation("class A {}", &["System.Linq", "System.Linq"], &arena);
        let module = ModuleEmitter::default().emit(&compilation).unwrap();
        assert_eq!(module.image().references, ["System.Linq"]);
    }

    #[test]
    fn syntax_errors_block_before_code_generation() {
        let arena = Bump::new();
        let compilation = compilation("class A { int x }", DEFAULT_REFERENCES, &arena);
        let failure = ModuleEmitter::default().emit(&compilation).unwrap_err();
        assert!(failure.errors().all(|d| d.code.starts_with("QC1")));
        assert!(failure.errors().count() > 0);
    }

    #[test]
    fn warnings_reach_the_module() {
        let arena = Bump::new();
        let compilation = compilation(
            "class A { public int M() { return 1; return 2; } }",
            DEFAULT_REFERENCES,
            &arena,
        );
        let module = ModuleEmitter::default().emit(&compilation).unwrap();
        assert!(module.warnings().contains_code("QC0162"));
    }
}
