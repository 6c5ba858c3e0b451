//! quickc Compiler
//!
//! A 2-pass compiler from the C# subset to `QCIL` module images.
//!
//! ## Architecture
//!
//! - **Pass 1 (Registration)**: declare namespaces, classes and member signatures
//! - **Pass 2 (Compilation)**: type check member bodies and generate bytecode
//!
//! ## Modules
//!
//! - [`bytecode`]: Bytecode types (OpCode, BytecodeChunk, ConstantPool)
//! - [`context`]: Compilation context with namespace-aware resolution
//! - [`conversion`]: Implicit conversions and numeric promotion
//! - [`emit`]: High-level bytecode emitter
//! - [`expr`]: Expression compiler with constant folding
//! - [`function_compiler`]: One method body from parameters to final return
//! - [`image`]: The module image and its binary codec
//! - [`options`]: Compilation options
//! - [`overload`]: Overload resolution for method calls
//! - [`scope`]: Local scope management for method compilation
//! - [`stmt`]: Statement compiler for control flow and declarations

pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod emit;
pub mod expr;
mod expr_info;
pub mod function_compiler;
pub mod image;
pub mod imports;
pub mod options;
pub mod overload;
pub mod passes;
pub mod scope;
pub mod stmt;

use std::sync::Arc;

use quickc_modules::Library;
use quickc_parser::ast::Script;

pub use context::{ClassRef, CompilationContext};
pub use emit::{BreakError, BytecodeEmitter, JumpLabel};
pub use expr::ExprCompiler;
pub use expr_info::ExprInfo;
pub use image::{
    ClassImage, FieldImage, ImageError, ImageFlags, MethodImage, MethodKind, ModuleImage,
    NativeImport, read_image, write_image,
};
pub use options::{CompilationOptions, OptimizationLevel, OutputKind};
pub use passes::{CompilationPass, RegistrationPass};
pub use scope::{LocalScope, LocalVar};
pub use stmt::StmtCompiler;

// Re-export CompilationError from core for convenience
pub use quickc_core::{CompilationError, Diagnostic, Diagnostics};

/// Compiles one script into a module image.
#[derive(Debug, Clone)]
pub struct Compiler {
    module_name: String,
    options: CompilationOptions,
    references: Vec<Arc<Library>>,
}

/// Result of compilation.
#[derive(Debug)]
pub struct CompileOutput {
    /// The module, present unless a diagnostic blocks it.
    pub image: Option<ModuleImage>,
    /// Everything reported, warnings included.
    pub diagnostics: Diagnostics,
}

impl Compiler {
    pub fn new(module_name: impl Into<String>, options: CompilationOptions) -> Self {
        Self {
            module_name: module_name.into(),
            options,
            references: Vec::new(),
        }
    }

    pub fn with_references(mut self, references: Vec<Arc<Library>>) -> Self {
        self.references = references;
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn compile(&self, script: &Script<'_>) -> CompileOutput {
        #[cfg(feature = "profiling")]
        profiling::scope!("Compiler::compile");

        let mut ctx = CompilationContext::new(self.options.clone(), self.references.clone());
        let registered = RegistrationPass::new(&mut ctx).run(script);
        let compiled = CompilationPass::new(&ctx).run();

        let mut diagnostics = registered.diagnostics;
        diagnostics.extend(compiled.diagnostics);
        if self.options.warnings_as_errors {
            diagnostics = diagnostics.promote_warnings();
        }

        tracing::debug!(
            module = %self.module_name,
            classes = compiled.classes.len(),
            diagnostics = diagnostics.len(),
            "compiled module"
        );

        let image = (!diagnostics.has_blocking()).then(|| ModuleImage {
            name: self.module_name.clone(),
            flags: ImageFlags {
                overflow_checks: self.options.overflow_checks,
                release: self.options.is_release(),
            },
            output_kind: self.options.output_kind,
            references: self.references.iter().map(|lib| lib.name().to_string()).collect(),
            constants: compiled.constants,
            imports: compiled.imports,
            classes: compiled.classes,
        });

        CompileOutput { image, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use quickc_parser::Parser;

    use super::*;

    fn compile_with(source: &str, options: CompilationOptions) -> CompileOutput {
        let arena = Bump::new();
        let parsed = Parser::parse(source, &arena).unwrap();
        assert!(parsed.errors.is_empty(), "{}", parsed.errors);
        Compiler::new("Module", options)
            .with_references(vec![Arc::new(quickc_modules::runtime::library())])
            .compile(&parsed.script)
    }

    fn compile(source: &str) -> CompileOutput {
        compile_with(source, CompilationOptions::default().with_usings(["System"]))
    }

    #[test]
    fn greeter_compiles() {
        let output = compile(
            "namespace Samples {
                public class Greeter {
                    private string greeting = \"Hello\";
                    public string Greet(string name) { return greeting + \", \" + name + \"!\"; }
                }
            }",
        );
        assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
        let image = output.image.unwrap();
        assert_eq!(image.name, "Module");
        assert_eq!(image.references, ["System.Runtime"]);
        assert!(image.flags.overflow_checks && image.flags.release);

        let greeter = &image.classes[image.find_class("Samples.Greeter").unwrap()];
        assert_eq!(greeter.methods[0].signature(), "Greet(string)");
        assert_eq!(greeter.methods[1].name, ".ctor");
    }

    #[test]
    fn errors_block_the_image() {
        let output = compile("class Bad { void M() { return 1; } }");
        assert!(output.image.is_none());
        assert!(output.diagnostics.contains_code("QC0127"));
    }

    #[test]
    fn warnings_pass_unless_promoted() {
        let source = "class W { int M() { return 1; return 2; } }";
        let output = compile(source);
        assert!(output.image.is_some());
        assert!(output.diagnostics.contains_code(stmt::UNREACHABLE_CODE));

        let options = CompilationOptions::default().with_warnings_as_errors(true);
        let output = compile_with(source, options);
        assert!(output.image.is_none());
        assert!(output.diagnostics.has_blocking());
    }

    #[test]
    fn methods_may_call_methods_declared_later() {
        let output = compile(
            "class C { public int A() => B(2) + Twice(1); int B(int x) => x; static int Twice(int x) => x * 2; }",
        );
        assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    }
}
