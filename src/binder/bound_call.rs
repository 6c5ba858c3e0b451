use std::marker::PhantomData;

use quickc_compiler::MethodImage;
use quickc_core::{RuntimeError, Value, format_params};

use super::{DynamicInstance, MethodSignature, ScriptArgs, ScriptReturn};
use crate::error::InvokeError;

/// A method bound to one instance with a statically known signature.
pub struct BoundCall<'i, Args, Ret> {
    instance: &'i DynamicInstance<'i>,
    method: usize,
    signature: PhantomData<fn(Args) -> Ret>,
}

impl<'i, Args: ScriptArgs, Ret: ScriptReturn> BoundCall<'i, Args, Ret> {
    pub(crate) fn new(instance: &'i DynamicInstance<'i>, method: usize) -> Self {
        Self {
            instance,
            method,
            signature: PhantomData,
        }
    }

    pub fn method(&self) -> &'i MethodImage {
        self.instance.method(self.method)
    }

    pub fn invoke(&self, args: Args) -> Result<Ret, InvokeError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("BoundCall::invoke");

        let value = self.instance.run(self.method, args.into_values())?;
        convert_return(self.method(), value)
    }
}

/// A method bound by a runtime signature; arguments are checked per call.
pub struct DynamicCall<'i> {
    instance: &'i DynamicInstance<'i>,
    method: usize,
    signature: MethodSignature,
}

impl<'i> DynamicCall<'i> {
    pub(crate) fn new(instance: &'i DynamicInstance<'i>, method: usize, signature: MethodSignature) -> Self {
        Self {
            instance,
            method,
            signature,
        }
    }

    pub fn method(&self) -> &'i MethodImage {
        self.instance.method(self.method)
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        let matches = args.len() == self.signature.params.len()
            && args
                .iter()
                .zip(&self.signature.params)
                .all(|(arg, ty)| arg.data_type() == *ty);
        if !matches {
            return Err(InvokeError::ArgumentMismatch {
                method: self.method().signature(),
                expected: format_params(&self.signature.params),
                found: args.iter().map(Value::type_name).collect::<Vec<_>>().join(", "),
            });
        }
        Ok(self.instance.run(self.method, args.to_vec())?)
    }
}

fn convert_return<Ret: ScriptReturn>(method: &MethodImage, value: Value) -> Result<Ret, InvokeError> {
    let found = value.type_name();
    Ret::from_value(value).ok_or_else(|| {
        InvokeError::Runtime(RuntimeError::InvalidBytecode {
            offset: 0,
            detail: format!("{} returned {found}, expected {}", method.signature(), Ret::DATA_TYPE),
        })
    })
}
