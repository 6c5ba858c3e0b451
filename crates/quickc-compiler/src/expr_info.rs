//! Expression type information for the compiler.

use quickc_core::{DataType, Value};

/// Result of type-checking and emitting an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInfo {
    /// The type of the value left on the stack. Void leaves nothing.
    pub ty: DataType,
    /// The value, when it is known at compile time.
    pub constant: Option<Value>,
    /// Code offset where the expression's code begins.
    pub start: usize,
}

impl ExprInfo {
    pub fn rvalue(ty: DataType, start: usize) -> Self {
        Self {
            ty,
            constant: None,
            start,
        }
    }

    pub fn constant(value: Value, start: usize) -> Self {
        Self {
            ty: value.data_type(),
            constant: Some(value),
            start,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }

    /// `true` for the constant `true`.
    pub fn is_true(&self) -> bool {
        matches!(self.constant, Some(Value::Bool(true)))
    }

    pub fn is_false(&self) -> bool {
        matches!(self.constant, Some(Value::Bool(false)))
    }
}
