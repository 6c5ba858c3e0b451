//! Bytecode emitter.
//!
//! [`BytecodeEmitter`] builds the code of one method. Constants go into the
//! shared module pool. Forward jumps are relative, so a fragment of code taken
//! out with [`BytecodeEmitter::take_since`] can be re-appended anywhere.
//!
//! ```
//! use quickc_compiler::bytecode::{ConstantPool, OpCode};
//! use quickc_compiler::emit::BytecodeEmitter;
//! use quickc_core::Value;
//!
//! let mut constants = ConstantPool::new();
//! let mut emitter = BytecodeEmitter::new(&mut constants);
//! emitter.emit_value(&Value::Int(40));
//! emitter.emit_value(&Value::Int(2));
//! emitter.emit(OpCode::AddI32);
//! emitter.emit(OpCode::Return);
//!
//! let chunk = emitter.finish().unwrap();
//! assert_eq!(chunk.len(), 8);
//! ```

mod jumps;

use quickc_core::Value;
use thiserror::Error;

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};
pub use jumps::{JumpManager, LoopExit};

/// Position of a forward jump's operand, patched once the target is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BreakError {
    #[error("not inside a loop")]
    NotInLoop,
}

/// An operand did not fit its 16-bit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("method body is too large to encode")]
pub struct CodeTooLarge;

pub struct BytecodeEmitter<'pool> {
    chunk: BytecodeChunk,
    constants: &'pool mut ConstantPool,
    jumps: JumpManager,
    /// Set when a jump distance or index exceeded `u16::MAX`.
    oversized: bool,
}

impl<'pool> BytecodeEmitter<'pool> {
    pub fn new(constants: &'pool mut ConstantPool) -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            constants,
            jumps: JumpManager::new(),
            oversized: false,
        }
    }

    fn operand(&mut self, value: usize) -> u16 {
        u16::try_from(value).unwrap_or_else(|_| {
            self.oversized = true;
            u16::MAX
        })
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op);
    }

    pub fn emit_u16(&mut self, op: OpCode, operand: u16) {
        self.chunk.write_op(op);
        self.chunk.write_u16(operand);
    }

    pub fn emit_constant(&mut self, constant: Constant) {
        let index = self.constants.add(constant) as usize;
        let index = self.operand(index);
        self.emit_u16(OpCode::Constant, index);
    }

    /// Push a known value. Void pushes nothing.
    pub fn emit_value(&mut self, value: &Value) {
        match value {
            Value::Bool(true) => self.emit(OpCode::PushTrue),
            Value::Bool(false) => self.emit(OpCode::PushFalse),
            Value::Void => {}
            other => {
                if let Some(constant) = Constant::from_value(other) {
                    self.emit_constant(constant);
                }
            }
        }
    }

    pub fn emit_get_local(&mut self, slot: u16) {
        self.emit_u16(OpCode::GetLocal, slot);
    }

    pub fn emit_set_local(&mut self, slot: u16) {
        self.emit_u16(OpCode::SetLocal, slot);
    }

    pub fn emit_call(&mut self, class: u16, method: u16) {
        self.chunk.write_op(OpCode::Call);
        self.chunk.write_u16(class);
        self.chunk.write_u16(method);
    }

    pub fn emit_call_native(&mut self, import: u16) {
        self.emit_u16(OpCode::CallNative, import);
    }

    // ==========================================================================
    // Code Surgery
    // ==========================================================================

    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    /// Drop the code emitted from `offset` on, with any jumps pending there.
    pub fn truncate(&mut self, offset: usize) {
        self.chunk.truncate(offset);
        self.jumps.discard_from(offset);
    }

    /// Insert a conversion (or other operand-less op) at an earlier offset.
    pub fn insert_op(&mut self, offset: usize, op: OpCode) {
        self.chunk.insert_op(offset, op);
        self.jumps.shift_from(offset, 1);
    }

    /// Cut out the code emitted since `start`, to be re-appended later.
    pub fn take_since(&mut self, start: usize) -> Vec<u8> {
        self.chunk.split_off(start)
    }

    pub fn append(&mut self, code: &[u8]) {
        self.chunk.extend(code);
    }

    // ==========================================================================
    // Jumps and Control Flow
    // ==========================================================================

    /// Emit a forward jump with a placeholder distance.
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        self.emit(op);
        let offset = self.chunk.current_offset();
        self.chunk.write_u16(0xFFFF);
        JumpLabel(offset)
    }

    /// Point a forward jump at the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) {
        let distance = self.chunk.current_offset() - label.0 - 2;
        let distance = self.operand(distance);
        self.chunk.patch_u16(label.0, distance);
    }

    /// Emit a backward jump to `target`.
    pub fn emit_loop(&mut self, target: usize) {
        self.emit(OpCode::Loop);
        let distance = self.chunk.current_offset() + 2 - target;
        let distance = self.operand(distance);
        self.chunk.write_u16(distance);
    }

    // ==========================================================================
    // Loop Control (Break/Continue)
    // ==========================================================================

    /// `continue_target` is the loop start for loops that re-test at the top;
    /// `None` when `continue` must jump forward to code emitted after the body.
    pub fn enter_loop(&mut self, continue_target: Option<usize>) {
        self.jumps.enter_loop(continue_target);
    }

    /// Patch all `break`s to the current position.
    pub fn exit_loop(&mut self) -> LoopExit {
        let exit = self.jumps.exit_loop();
        for &label in &exit.break_labels {
            self.patch_jump(label);
        }
        exit
    }

    pub fn emit_break(&mut self, reachable: bool) -> Result<(), BreakError> {
        if !self.jumps.in_loop() {
            return Err(BreakError::NotInLoop);
        }
        let label = self.emit_jump(OpCode::Jump);
        self.jumps.add_break(label, reachable);
        Ok(())
    }

    pub fn emit_continue(&mut self, reachable: bool) -> Result<(), BreakError> {
        match self.jumps.note_continue(reachable) {
            None => Err(BreakError::NotInLoop),
            Some(Some(target)) => {
                self.emit_loop(target);
                Ok(())
            }
            Some(None) => {
                let label = self.emit_jump(OpCode::Jump);
                self.jumps.add_continue(label, reachable);
                Ok(())
            }
        }
    }

    /// Patch forward `continue`s of the innermost loop to the current position.
    pub fn patch_continues(&mut self) {
        for label in self.jumps.take_continue_labels() {
            self.patch_jump(label);
        }
    }

    pub fn in_loop(&self) -> bool {
        self.jumps.in_loop()
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    pub fn code(&self) -> &[u8] {
        self.chunk.code()
    }

    pub fn finish(self) -> Result<BytecodeChunk, CodeTooLarge> {
        if self.oversized {
            Err(CodeTooLarge)
        } else {
            Ok(self.chunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(op: OpCode) -> u8 {
        op as u8
    }

    #[test]
    fn constants_are_pooled() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        emitter.emit_value(&Value::from("a"));
        emitter.emit_value(&Value::from("a"));
        emitter.emit_value(&Value::Bool(true));
        let chunk = emitter.finish().unwrap();
        assert_eq!(
            chunk.code(),
            [op(OpCode::Constant), 0, 0, op(OpCode::Constant), 0, 0, op(OpCode::PushTrue)]
        );
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn forward_jump_distance_is_relative() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        let label = emitter.emit_jump(OpCode::JumpIfFalse);
        emitter.emit(OpCode::Pop);
        emitter.emit(OpCode::Pop);
        emitter.patch_jump(label);
        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_u16(1), Some(2));
    }

    #[test]
    fn loop_jumps_back_to_target() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        emitter.emit(OpCode::PushTrue);
        emitter.emit(OpCode::Pop);
        emitter.emit_loop(0);
        let chunk = emitter.finish().unwrap();
        // ip after the LOOP instruction is 5; 5 - 5 = 0.
        assert_eq!(chunk.read_u16(3), Some(5));
    }

    #[test]
    fn break_outside_loop_fails() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        assert_eq!(emitter.emit_break(true), Err(BreakError::NotInLoop));
        assert_eq!(emitter.emit_continue(true), Err(BreakError::NotInLoop));
    }

    #[test]
    fn breaks_are_patched_on_exit() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        emitter.enter_loop(Some(0));
        emitter.emit_break(true).unwrap();
        emitter.emit(OpCode::Pop);
        let exit = emitter.exit_loop();
        assert!(exit.has_break);
        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_u16(1), Some(1));
    }

    #[test]
    fn forward_continue_is_patched_after_the_body() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        emitter.enter_loop(None);
        emitter.emit_continue(true).unwrap();
        emitter.emit(OpCode::Pop);
        emitter.patch_continues();
        let exit = emitter.exit_loop();
        assert!(exit.has_continue);
        assert_eq!(emitter.finish().unwrap().read_u16(1), Some(1));
    }

    #[test]
    fn fragments_can_be_moved() {
        let mut pool = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut pool);
        emitter.emit(OpCode::PushTrue);
        let start = emitter.current_offset();
        emitter.emit(OpCode::PushFalse);
        let fragment = emitter.take_since(start);
        emitter.emit(OpCode::Not);
        emitter.append(&fragment);
        emitter.insert_op(1, OpCode::Dup);
        assert_eq!(
            emitter.code(),
            [op(OpCode::PushTrue), op(OpCode::Dup), op(OpCode::Not), op(OpCode::PushFalse)]
        );
    }
}
