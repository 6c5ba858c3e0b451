//! Error types of the compile-and-invoke pipeline.
//!
//! ```text
//! CompileError    - compile() failed; no module was produced
//!   ├─ InvalidPolicy(ProviderError)
//!   ├─ Parse(ParseFailure)     - source could not be parsed at all
//!   └─ Emit(EmitFailure)       - diagnostics blocked the module
//! BindError       - instance creation or method binding failed
//! InvokeError     - a bound call failed while running
//! LoadError       - a module image could not be loaded
//! ```

use quickc_compiler::ImageError;
use quickc_core::{Diagnostic, Diagnostics, ParseError, RuntimeError};
use thiserror::Error;

/// A provider could not produce its value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("'{name}' is not a valid module name")]
    InvalidModuleName { name: String },
}

/// The source text is fundamentally unparsable.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("source could not be parsed: {error}")]
pub struct ParseFailure {
    #[source]
    pub error: ParseError,
}

/// Code generation reported blocking diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("emit failed with {} error(s)", self.errors().count())]
pub struct EmitFailure {
    /// Every diagnostic reported, in emission order.
    pub diagnostics: Diagnostics,
}

impl EmitFailure {
    /// The diagnostics that blocked the module.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_blocking())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.diagnostics.contains_code(code)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    InvalidPolicy(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Emit(#[from] EmitFailure),
}

impl CompileError {
    /// The diagnostics of a failed emit, if that is what failed.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            CompileError::Emit(failure) => Some(&failure.diagnostics),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("type '{type_name}' was not found in module '{module}'")]
    TypeNotFound { type_name: String, module: String },

    #[error("could not construct '{type_name}' through '{signature}'")]
    ConstructionFailure {
        type_name: String,
        signature: String,
        /// Set when the constructor ran and faulted.
        #[source]
        cause: Option<RuntimeError>,
    },

    #[error("'{type_name}' has no public instance method '{signature}'")]
    MethodNotFound { type_name: String, signature: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("'{method}' takes ({expected}), called with ({found})")]
    ArgumentMismatch {
        method: String,
        expected: String,
        found: String,
    },
}

/// Faults found while loading a module image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("referenced library '{name}' is not available")]
    MissingReference { name: String },

    #[error("native import '{name}' is not provided by any referenced library")]
    UnresolvedImport { name: String },

    #[error("native import '{name}' does not match its library signature")]
    ImportSignatureMismatch { name: String },

    #[error(transparent)]
    TypeInitializer(#[from] RuntimeError),
}

/// A one-step bind-and-invoke failed at either step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
