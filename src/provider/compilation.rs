use super::Provider;
use crate::assembler::Compilation;
use crate::error::ParseFailure;

/// Provides the compilation object the emitter generates code from.
///
/// [`CompilationAssembler`](crate::assembler::CompilationAssembler) is the
/// standard implementation; any provider of the same result qualifies.
pub trait CompilationProvider<'ast>: Provider<Result<Compilation<'ast>, ParseFailure>> {}

impl<'ast, P> CompilationProvider<'ast> for P where P: Provider<Result<Compilation<'ast>, ParseFailure>> {}
