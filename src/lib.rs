//! # quickc
//!
//! Compile C#-subset source text into an in-memory module at runtime, then
//! create instances of its types and invoke their methods by name.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = quickc::compile(
//!     "class Calculator { public int Add(int a, int b) => a + b; }",
//!     None,
//! )?;
//! let calculator = module.create_instance("Calculator")?;
//! let add = calculator.bind::<(i32, i32), i32>("Add")?;
//! assert_eq!(add.invoke((2, 3))?, 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`provider`]: source text, module name, namespaces, references and
//!    options each come from a provider.
//! 2. [`CompilationAssembler`]: parses the source and fixes the policy into
//!    one [`Compilation`].
//! 3. [`ModuleEmitter`]: generates the module image into a memory buffer and
//!    loads it, or returns the blocking diagnostics.
//! 4. [`binder`]: instances and bound calls over the [`LoadedModule`].

pub mod assembler;
pub mod binder;
pub mod compiler;
pub mod emitter;
pub mod error;
pub mod module;
pub mod provider;
mod vm;

pub use assembler::{Compilation, CompilationAssembler};
pub use binder::{BoundCall, DynamicCall, DynamicInstance, MethodSignature, ScriptArgs, ScriptReturn, ScriptType};
pub use compiler::{DefaultMemoryCompiler, MemoryCompiler, PolicyOverrides, compile};
pub use emitter::{LOAD_FAILURE, ModuleEmitter};
pub use error::{
    BindError, CallError, CompileError, EmitFailure, InvokeError, LoadError, ParseFailure, ProviderError,
};
pub use module::LoadedModule;
pub use vm::MAX_CALL_DEPTH;

pub use quickc_compiler::{CompilationOptions, OptimizationLevel, OutputKind};
pub use quickc_core::{DataType, Diagnostic, Diagnostics, RuntimeError, Severity, Value};
pub use quickc_modules::ReferenceCatalog;
