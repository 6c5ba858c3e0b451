//! Shared vocabulary for the quickc toolchain.
//!
//! Every other crate in the workspace speaks in these types: source spans,
//! diagnostics, primitive data types and values, deterministic type hashes,
//! and the plumbing reference libraries use to expose native functions.

mod data_type;
mod diagnostics;
mod error;
mod native_fn;
mod qualified_name;
mod span;
mod type_hash;
mod value;
mod visibility;

pub use data_type::{DataType, format_params};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{
    CompilationError, LexError, NativeError, ParseError, ParseErrorKind, ParseErrors,
    RuntimeError,
};
pub use native_fn::{CallContext, NativeCallable, NativeFn};
pub use qualified_name::QualifiedName;
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants};
pub use value::Value;
pub use visibility::Visibility;
