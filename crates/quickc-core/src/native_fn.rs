//! Native function storage and execution context.
//!
//! Reference libraries expose their functions as [`NativeFn`]s. The VM calls
//! them through a [`CallContext`] holding the evaluated arguments, a return
//! slot and the instance's output sink.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::{NativeError, Value};

/// Type-erased native function.
///
/// Cloning shares the underlying callable.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a callable implemented as its own type.
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: NativeCallable + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(callable),
        }
    }

    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

/// Trait for callable native functions.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}

/// Arguments, return slot and output sink for one native call.
pub struct CallContext<'a> {
    args: &'a [Value],
    ret: Value,
    out: &'a mut dyn Write,
}

impl<'a> CallContext<'a> {
    pub fn new(args: &'a [Value], out: &'a mut dyn Write) -> Self {
        Self {
            args,
            ret: Value::Void,
            out,
        }
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Result<&Value, NativeError> {
        self.args
            .get(index)
            .ok_or(NativeError::MissingArgument { index })
    }

    pub fn arg_int(&self, index: usize) -> Result<i32, NativeError> {
        let value = self.arg(index)?;
        value.as_int().ok_or_else(|| mismatch(index, "int", value))
    }

    pub fn arg_long(&self, index: usize) -> Result<i64, NativeError> {
        let value = self.arg(index)?;
        value.as_long().ok_or_else(|| mismatch(index, "long", value))
    }

    pub fn arg_double(&self, index: usize) -> Result<f64, NativeError> {
        let value = self.arg(index)?;
        value.as_double().ok_or_else(|| mismatch(index, "double", value))
    }

    pub fn arg_bool(&self, index: usize) -> Result<bool, NativeError> {
        let value = self.arg(index)?;
        value.as_bool().ok_or_else(|| mismatch(index, "bool", value))
    }

    pub fn arg_str(&self, index: usize) -> Result<&str, NativeError> {
        let value = self.arg(index)?;
        value.as_str().ok_or_else(|| mismatch(index, "string", value))
    }

    pub fn set_return(&mut self, value: impl Into<Value>) {
        self.ret = value.into();
    }

    pub fn take_return(&mut self) -> Value {
        std::mem::replace(&mut self.ret, Value::Void)
    }

    /// Write text to the output sink of the calling instance.
    pub fn write_output(&mut self, text: &str) -> Result<(), NativeError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| NativeError::Output(e.to_string()))
    }
}

fn mismatch(index: usize, expected: &'static str, found: &Value) -> NativeError {
    NativeError::ArgumentType {
        index,
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sets_return_value() {
        let add = NativeFn::new(|ctx: &mut CallContext<'_>| {
            let sum = ctx.arg_int(0)? + ctx.arg_int(1)?;
            ctx.set_return(sum);
            Ok(())
        });

        let args = [Value::Int(2), Value::Int(3)];
        let mut sink = Vec::new();
        let mut ctx = CallContext::new(&args, &mut sink);
        add.call(&mut ctx).unwrap();
        assert_eq!(ctx.take_return(), Value::Int(5));
    }

    struct Constant(i32);

    impl NativeCallable for Constant {
        fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
            ctx.set_return(self.0);
            Ok(())
        }
    }

    #[test]
    fn callable_types_are_wrapped() {
        let f = NativeFn::from_callable(Constant(9));
        let mut sink = Vec::new();
        let mut ctx = CallContext::new(&[], &mut sink);
        f.call(&mut ctx).unwrap();
        assert_eq!(ctx.take_return(), Value::Int(9));
    }

    #[test]
    fn wrong_argument_type_is_reported() {
        let args = [Value::from("x")];
        let mut sink = Vec::new();
        let ctx = CallContext::new(&args, &mut sink);
        assert_eq!(
            ctx.arg_int(0),
            Err(NativeError::ArgumentType {
                index: 0,
                expected: "int",
                found: "string"
            })
        );
        assert_eq!(ctx.arg_int(1), Err(NativeError::MissingArgument { index: 1 }));
    }

    #[test]
    fn output_goes_to_sink() {
        let mut sink = Vec::new();
        {
            let mut ctx = CallContext::new(&[], &mut sink);
            ctx.write_output("Hello").unwrap();
        }
        assert_eq!(sink, b"Hello");
    }
}
