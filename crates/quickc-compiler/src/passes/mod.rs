//! Compiler passes.
//!
//! - [`registration`]: Pass 1 - declare namespaces, classes and member signatures
//! - [`compilation`]: Pass 2 - type check member bodies and generate bytecode

pub mod compilation;
pub mod registration;

pub use compilation::{CompilationOutput, CompilationPass};
pub use registration::{RegistrationOutput, RegistrationPass};
