//! Lexer and parser for the quickc scripting language, a C# subset.
//!
//! This crate provides:
//! - Lexical analysis (tokenization)
//! - Arena-allocated AST definitions
//! - A recovering recursive-descent parser
//!
//! # Example
//!
//! ```
//! use quickc_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     public class Greeter {
//!         public string Greet(string name) => "Hello, " + name;
//!     }
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(output) if output.errors.is_empty() => {
//!         println!("parsed {} items", output.script.items().len())
//!     }
//!     Ok(output) => eprintln!("syntax errors:\n{}", output.errors),
//!     Err(fatal) => eprintln!("unparseable: {fatal}"),
//! }
//! ```

pub mod lexer;

pub mod ast;

pub use ast::{MAX_NESTING, ParseOutput, Parser};
pub use lexer::{Lexer, Token, TokenKind};
