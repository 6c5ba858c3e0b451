//! Dynamic invocation of module methods.
//!
//! A [`DynamicInstance`] is a default-constructed object of a module type.
//! Methods are bound by name and exact signature, either through Rust types
//! ([`BoundCall`]) or through a [`MethodSignature`] descriptor
//! ([`DynamicCall`]). Only public instance methods are bindable; signatures
//! are checked at bind time.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = quickc::compile(
//!     "class Greeter { public string Greet(string name) => \"Hello, \" + name; }",
//!     None,
//! )?;
//! let greeter = module.create_instance("Greeter")?;
//! let greet = greeter.bind::<(String,), String>("Greet")?;
//! assert_eq!(greet.invoke(("World".to_string(),))?, "Hello, World");
//! # Ok(())
//! # }
//! ```

mod bound_call;
mod instance;
mod signature;

pub use bound_call::{BoundCall, DynamicCall};
pub use instance::DynamicInstance;
pub use signature::{MethodSignature, ScriptArgs, ScriptReturn, ScriptType};
