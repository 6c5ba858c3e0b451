//! The compilation assembler.
//!
//! [`CompilationAssembler`] composes the providers into one [`Compilation`]:
//! it parses the source, asks for the module name exactly once, and gathers
//! the references and options. It only fails when the source cannot be
//! parsed at all. Syntax errors travel inside the compilation and semantic
//! errors are found at emit time.

use quickc_compiler::CompilationOptions;

use crate::error::ParseFailure;
use crate::provider::{MetadataReference, Provider, SyntaxTree};

/// Everything code generation needs, fixed for the duration of one compile.
#[derive(Debug, Clone)]
pub struct Compilation<'ast> {
    module_name: String,
    syntax_tree: SyntaxTree<'ast>,
    references: Vec<MetadataReference>,
    options: CompilationOptions,
}

impl<'ast> Compilation<'ast> {
    pub fn new(
        module_name: String,
        syntax_tree: SyntaxTree<'ast>,
        references: Vec<MetadataReference>,
        options: CompilationOptions,
    ) -> Self {
        Self {
            module_name,
            syntax_tree,
            references,
            options,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn syntax_tree(&self) -> &SyntaxTree<'ast> {
        &self.syntax_tree
    }

    pub fn references(&self) -> &[MetadataReference] {
        &self.references
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }
}

type SyntaxTreeSource<'p, 'ast> = Box<dyn Provider<Result<SyntaxTree<'ast>, ParseFailure>> + 'p>;

pub struct CompilationAssembler<'p, 'ast> {
    syntax_tree: SyntaxTreeSource<'p, 'ast>,
    module_name: Box<dyn Provider<String> + 'p>,
    references: Box<dyn Provider<Vec<MetadataReference>> + 'p>,
    options: Box<dyn Provider<CompilationOptions> + 'p>,
}

impl<'p, 'ast> CompilationAssembler<'p, 'ast> {
    pub fn new(
        syntax_tree: impl Provider<Result<SyntaxTree<'ast>, ParseFailure>> + 'p,
        module_name: impl Provider<String> + 'p,
        references: impl Provider<Vec<MetadataReference>> + 'p,
        options: impl Provider<CompilationOptions> + 'p,
    ) -> Self {
        Self {
            syntax_tree: Box::new(syntax_tree),
            module_name: Box::new(module_name),
            references: Box::new(references),
            options: Box::new(options),
        }
    }

    pub fn assemble(&self) -> Result<Compilation<'ast>, ParseFailure> {
        #[cfg(feature = "profiling")]
        profiling::scope!("CompilationAssembler::assemble");

        let syntax_tree = self.syntax_tree.provide()?;
        let module_name = self.module_name.provide();
        let references = self.references.provide();
        let options = self.options.provide();

        tracing::debug!(
            module = %module_name,
            references = references.len(),
            syntax_diagnostics = syntax_tree.diagnostics().len(),
            "assembled compilation"
        );
        Ok(Compilation::new(module_name, syntax_tree, references, options))
    }
}

impl<'ast> Provider<Result<Compilation<'ast>, ParseFailure>> for CompilationAssembler<'_, 'ast> {
    fn provide(&self) -> Result<Compilation<'ast>, ParseFailure> {
        self.assemble()
    }
}
