//! Reference libraries for quickc modules.
//!
//! Compiled scripts reach native functionality through named libraries:
//! `System.Runtime` (console, math, strings, conversions, paths, regular
//! expressions), `System.Net.Primitives` and `System.Linq`. A
//! [`ReferenceCatalog`] maps library identifiers to their metadata and is
//! what the compiler resolves references against.

mod catalog;
mod library;

pub mod linq;
pub mod net;
pub mod runtime;

pub use catalog::ReferenceCatalog;
pub use library::{ClassBuilder, Library, NativeClass, NativeConstant, NativeFunction};
