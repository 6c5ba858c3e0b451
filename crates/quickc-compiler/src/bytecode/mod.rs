//! Bytecode types:
//!
//! - [`OpCode`]: the instruction set
//! - [`BytecodeChunk`]: compiled code of one method
//! - [`Constant`] and [`ConstantPool`]: module-level constant storage
//! - [`eval`]: what the value-computing instructions compute

mod chunk;
mod constant;
pub mod eval;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use eval::EvalError;
pub use opcode::OpCode;
