//! The stack machine that executes loaded module bytecode.
//!
//! One [`Vm`] runs one top-level call to completion. Script instance methods
//! execute against the instance they were entered on; static methods see no
//! instance. Native imports receive their arguments through a
//! [`CallContext`] writing to the module's output sink.

use std::sync::MutexGuard;

use quickc_compiler::bytecode::{EvalError, OpCode, eval};
use quickc_compiler::{MethodImage, ModuleImage};
use quickc_core::{CallContext, RuntimeError, Value};

use crate::module::LoadedModule;

/// Frames a call chain may hold before it faults.
pub const MAX_CALL_DEPTH: usize = 1024;

#[derive(Debug)]
struct StackFrame {
    class: usize,
    method: usize,
    ip: usize,
    locals: Vec<Value>,
}

pub(crate) struct Vm<'m, 'f> {
    module: &'m LoadedModule,
    image: &'m ModuleImage,
    checked: bool,
    fields: Option<&'f mut [Value]>,
    statics: MutexGuard<'m, Vec<Value>>,
    call_stack: Vec<StackFrame>,
    value_stack: Vec<Value>,
}

impl<'m, 'f> Vm<'m, 'f> {
    /// A machine over `module`. `fields` is the receiver of instance methods.
    pub fn new(module: &'m LoadedModule, fields: Option<&'f mut [Value]>) -> Self {
        let image = module.image();
        Self {
            module,
            image,
            checked: image.flags.overflow_checks,
            fields,
            statics: module.lock_statics(),
            call_stack: Vec::new(),
            value_stack: Vec::new(),
        }
    }

    /// Run `class.method` with `args` and return what it returned.
    pub fn run(mut self, class: usize, method: usize, args: Vec<Value>) -> Result<Value, RuntimeError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("Vm::run");

        self.push_frame(class, method, args)?;
        loop {
            if let Some(value) = self.step()? {
                return Ok(value);
            }
        }
    }

    fn method(&self, class: usize, method: usize) -> Result<&'m MethodImage, RuntimeError> {
        let image = self.image;
        image
            .classes
            .get(class)
            .and_then(|c| c.methods.get(method))
            .ok_or_else(|| invalid(0, format!("no method {method} in class {class}")))
    }

    fn push_frame(&mut self, class: usize, method: usize, args: Vec<Value>) -> Result<(), RuntimeError> {
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        let image = self.method(class, method)?;
        if args.len() != image.params.len() {
            return Err(invalid(
                0,
                format!("{} takes {} arguments, got {}", image.signature(), image.params.len(), args.len()),
            ));
        }
        let mut locals = args;
        locals.resize(usize::from(image.locals), Value::Void);
        self.call_stack.push(StackFrame {
            class,
            method,
            ip: 0,
            locals,
        });
        Ok(())
    }

    fn frame(&mut self) -> Result<&mut StackFrame, RuntimeError> {
        self.call_stack
            .last_mut()
            .ok_or_else(|| invalid(0, "no active frame".into()))
    }

    fn pop(&mut self, offset: usize) -> Result<Value, RuntimeError> {
        self.value_stack
            .pop()
            .ok_or_else(|| invalid(offset, "value stack underflow".into()))
    }

    fn pop_args(&mut self, count: usize, offset: usize) -> Result<Vec<Value>, RuntimeError> {
        let start = self
            .value_stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| invalid(offset, "value stack underflow".into()))?;
        Ok(self.value_stack.split_off(start))
    }

    fn field_slot(&mut self, slot: usize, offset: usize) -> Result<&mut Value, RuntimeError> {
        self.fields
            .as_deref_mut()
            .and_then(|fields| fields.get_mut(slot))
            .ok_or_else(|| invalid(offset, format!("no instance field {slot}")))
    }

    fn static_slot(&mut self, slot: usize, offset: usize) -> Result<&mut Value, RuntimeError> {
        self.statics
            .get_mut(slot)
            .ok_or_else(|| invalid(offset, format!("no static field {slot}")))
    }

    /// Execute one instruction. Returns the result once the outermost
    /// frame returns.
    fn step(&mut self) -> Result<Option<Value>, RuntimeError> {
        let (class, method, offset) = {
            let frame = self.frame()?;
            (frame.class, frame.method, frame.ip)
        };
        let code = &self.method(class, method)?.code;
        let byte = *code
            .get(offset)
            .ok_or_else(|| invalid(offset, "ran past the end of the method".into()))?;
        let op = OpCode::from_u8(byte).ok_or_else(|| invalid(offset, format!("unknown opcode {byte:#04x}")))?;
        let end = offset + op.width();
        let operand = |i: usize| -> Result<usize, RuntimeError> {
            let at = offset + 1 + 2 * i;
            match code.get(at..at + 2) {
                Some(&[hi, lo]) => Ok(usize::from(u16::from_be_bytes([hi, lo]))),
                _ => Err(invalid(offset, format!("{op} operands truncated"))),
            }
        };
        let a = if op.operand_count() > 0 { operand(0)? } else { 0 };
        let b = if op.operand_count() > 1 { operand(1)? } else { 0 };
        self.frame()?.ip = end;

        match op {
            OpCode::Constant => {
                let constant = self
                    .image
                    .constants
                    .get(a)
                    .ok_or_else(|| invalid(offset, format!("no constant {a}")))?;
                self.value_stack.push(constant.to_value());
            }
            OpCode::PushTrue => self.value_stack.push(Value::Bool(true)),
            OpCode::PushFalse => self.value_stack.push(Value::Bool(false)),
            OpCode::Pop => {
                self.pop(offset)?;
            }
            OpCode::Dup => {
                let top = self
                    .value_stack
                    .last()
                    .cloned()
                    .ok_or_else(|| invalid(offset, "value stack underflow".into()))?;
                self.value_stack.push(top);
            }

            OpCode::GetLocal => {
                let value = self
                    .frame()?
                    .locals
                    .get(a)
                    .cloned()
                    .ok_or_else(|| invalid(offset, format!("no local {a}")))?;
                self.value_stack.push(value);
            }
            OpCode::SetLocal => {
                let value = self.pop(offset)?;
                let slot = self
                    .frame()?
                    .locals
                    .get_mut(a)
                    .ok_or_else(|| invalid(offset, format!("no local {a}")))?;
                *slot = value;
            }
            OpCode::GetField => {
                let value = self.field_slot(a, offset)?.clone();
                self.value_stack.push(value);
            }
            OpCode::SetField => {
                let value = self.pop(offset)?;
                *self.field_slot(a, offset)? = value;
            }
            OpCode::GetStatic => {
                let value = self.static_slot(a, offset)?.clone();
                self.value_stack.push(value);
            }
            OpCode::SetStatic => {
                let value = self.pop(offset)?;
                *self.static_slot(a, offset)? = value;
            }

            OpCode::Jump => self.frame()?.ip = end + a,
            OpCode::JumpIfFalse | OpCode::JumpIfTrue => {
                let condition = self
                    .pop(offset)?
                    .as_bool()
                    .ok_or_else(|| invalid(offset, format!("{op} on a non-bool")))?;
                if condition == (op == OpCode::JumpIfTrue) {
                    self.frame()?.ip = end + a;
                }
            }
            OpCode::Loop => {
                self.frame()?.ip = end
                    .checked_sub(a)
                    .ok_or_else(|| invalid(offset, "loop before method start".into()))?;
            }

            OpCode::Call => {
                let callee = self.method(a, b)?;
                let args = self.pop_args(callee.params.len(), offset)?;
                self.push_frame(a, b, args)?;
            }
            OpCode::CallNative => self.call_native(a, offset)?,
            OpCode::Return => {
                let value = self.pop(offset)?;
                self.call_stack.pop();
                if self.call_stack.is_empty() {
                    return Ok(Some(value));
                }
                self.value_stack.push(value);
            }
            OpCode::ReturnVoid => {
                self.call_stack.pop();
                if self.call_stack.is_empty() {
                    return Ok(Some(Value::Void));
                }
            }

            OpCode::NegI32
            | OpCode::NegI64
            | OpCode::NegF64
            | OpCode::Not
            | OpCode::I32ToI64
            | OpCode::I32ToF64
            | OpCode::I64ToF64
            | OpCode::ToStr
            | OpCode::StrLen => {
                let operand = self.pop(offset)?;
                let result = eval::unary(op, &operand, self.checked).map_err(|e| eval_fault(e, offset))?;
                self.value_stack.push(result);
            }
            _ => {
                let right = self.pop(offset)?;
                let left = self.pop(offset)?;
                let result =
                    eval::binary(op, &left, &right, self.checked).map_err(|e| eval_fault(e, offset))?;
                self.value_stack.push(result);
            }
        }
        Ok(None)
    }

    fn call_native(&mut self, index: usize, offset: usize) -> Result<(), RuntimeError> {
        let image = self.image;
        let module = self.module;
        let import = image
            .imports
            .get(index)
            .ok_or_else(|| invalid(offset, format!("no import {index}")))?;
        let function = module
            .native(index)
            .ok_or_else(|| invalid(offset, format!("import {index} is unbound")))?;
        let args = self.pop_args(import.params.len(), offset)?;

        let ret = {
            let mut out = module.lock_output();
            let mut ctx = CallContext::new(&args, &mut **out);
            function.call(&mut ctx).map_err(|source| RuntimeError::Native {
                function: import.name.clone(),
                source,
            })?;
            ctx.take_return()
        };
        if !import.return_type.is_void() {
            self.value_stack.push(ret);
        }
        Ok(())
    }
}

fn invalid(offset: usize, detail: String) -> RuntimeError {
    RuntimeError::InvalidBytecode { offset, detail }
}

fn eval_fault(error: EvalError, offset: usize) -> RuntimeError {
    match error {
        EvalError::Overflow => RuntimeError::Overflow,
        EvalError::DivideByZero => RuntimeError::DivideByZero,
        mismatch @ EvalError::TypeMismatch { .. } => invalid(offset, mismatch.to_string()),
    }
}
