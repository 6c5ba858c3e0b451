//! Semantics of the value-computing instructions.
//!
//! Shared by the virtual machine and by compile-time constant folding, so a
//! folded expression always yields what the instruction would have.

use quickc_core::Value;
use thiserror::Error;

use super::OpCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivideByZero,
    #[error("{op} cannot be applied to {operands}")]
    TypeMismatch { op: &'static str, operands: String },
}

fn mismatch(op: OpCode, values: &[&Value]) -> EvalError {
    EvalError::TypeMismatch {
        op: op.name(),
        operands: values
            .iter()
            .map(|v| v.type_name())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[derive(Clone, Copy)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

macro_rules! int_arith {
    ($name:ident, $ty:ty) => {
        fn $name(op: Arith, l: $ty, r: $ty, checked: bool) -> Result<$ty, EvalError> {
            match op {
                Arith::Div | Arith::Rem if r == 0 => Err(EvalError::DivideByZero),
                Arith::Div => l.checked_div(r).ok_or(EvalError::Overflow),
                Arith::Rem => l.checked_rem(r).ok_or(EvalError::Overflow),
                Arith::Add if !checked => Ok(l.wrapping_add(r)),
                Arith::Sub if !checked => Ok(l.wrapping_sub(r)),
                Arith::Mul if !checked => Ok(l.wrapping_mul(r)),
                Arith::Add => l.checked_add(r).ok_or(EvalError::Overflow),
                Arith::Sub => l.checked_sub(r).ok_or(EvalError::Overflow),
                Arith::Mul => l.checked_mul(r).ok_or(EvalError::Overflow),
            }
        }
    };
}

int_arith!(arith_i32, i32);
int_arith!(arith_i64, i64);

/// Evaluate a two-operand instruction. `checked` selects faulting over
/// wrapping integer arithmetic; division faults either way.
pub fn binary(op: OpCode, left: &Value, right: &Value, checked: bool) -> Result<Value, EvalError> {
    use OpCode::*;
    use Value::{Bool, Double, Int, Long, Str};

    Ok(match (op, left, right) {
        (AddI32, Int(l), Int(r)) => Int(arith_i32(Arith::Add, *l, *r, checked)?),
        (SubI32, Int(l), Int(r)) => Int(arith_i32(Arith::Sub, *l, *r, checked)?),
        (MulI32, Int(l), Int(r)) => Int(arith_i32(Arith::Mul, *l, *r, checked)?),
        (DivI32, Int(l), Int(r)) => Int(arith_i32(Arith::Div, *l, *r, checked)?),
        (ModI32, Int(l), Int(r)) => Int(arith_i32(Arith::Rem, *l, *r, checked)?),

        (AddI64, Long(l), Long(r)) => Long(arith_i64(Arith::Add, *l, *r, checked)?),
        (SubI64, Long(l), Long(r)) => Long(arith_i64(Arith::Sub, *l, *r, checked)?),
        (MulI64, Long(l), Long(r)) => Long(arith_i64(Arith::Mul, *l, *r, checked)?),
        (DivI64, Long(l), Long(r)) => Long(arith_i64(Arith::Div, *l, *r, checked)?),
        (ModI64, Long(l), Long(r)) => Long(arith_i64(Arith::Rem, *l, *r, checked)?),

        (AddF64, Double(l), Double(r)) => Double(l + r),
        (SubF64, Double(l), Double(r)) => Double(l - r),
        (MulF64, Double(l), Double(r)) => Double(l * r),
        (DivF64, Double(l), Double(r)) => Double(l / r),
        (ModF64, Double(l), Double(r)) => Double(l % r),

        (Concat, Str(l), Str(r)) => {
            let mut s = String::with_capacity(l.len() + r.len());
            s.push_str(l);
            s.push_str(r);
            Str(s)
        }

        (Eq, l, r) if l.data_type() == r.data_type() && !l.is_void() => Bool(l == r),
        (Ne, l, r) if l.data_type() == r.data_type() && !l.is_void() => Bool(l != r),

        (LtI32, Int(l), Int(r)) => Bool(l < r),
        (LeI32, Int(l), Int(r)) => Bool(l <= r),
        (GtI32, Int(l), Int(r)) => Bool(l > r),
        (GeI32, Int(l), Int(r)) => Bool(l >= r),
        (LtI64, Long(l), Long(r)) => Bool(l < r),
        (LeI64, Long(l), Long(r)) => Bool(l <= r),
        (GtI64, Long(l), Long(r)) => Bool(l > r),
        (GeI64, Long(l), Long(r)) => Bool(l >= r),
        (LtF64, Double(l), Double(r)) => Bool(l < r),
        (LeF64, Double(l), Double(r)) => Bool(l <= r),
        (GtF64, Double(l), Double(r)) => Bool(l > r),
        (GeF64, Double(l), Double(r)) => Bool(l >= r),

        _ => return Err(mismatch(op, &[left, right])),
    })
}

/// Evaluate a one-operand instruction.
#[allow(clippy::cast_precision_loss)]
pub fn unary(op: OpCode, operand: &Value, checked: bool) -> Result<Value, EvalError> {
    use OpCode::*;
    use Value::{Bool, Double, Int, Long, Str};

    Ok(match (op, operand) {
        (NegI32, Int(v)) if checked => Int(v.checked_neg().ok_or(EvalError::Overflow)?),
        (NegI32, Int(v)) => Int(v.wrapping_neg()),
        (NegI64, Long(v)) if checked => Long(v.checked_neg().ok_or(EvalError::Overflow)?),
        (NegI64, Long(v)) => Long(v.wrapping_neg()),
        (NegF64, Double(v)) => Double(-v),
        (Not, Bool(v)) => Bool(!v),
        (I32ToI64, Int(v)) => Long(i64::from(*v)),
        (I32ToF64, Int(v)) => Double(f64::from(*v)),
        (I64ToF64, Long(v)) => Double(*v as f64),
        (ToStr, v) if !v.is_void() => Str(v.to_string()),
        // Unicode scalar values, matching the `char` positions the string
        // library uses for `Substring` and `IndexOf`. Text outside the BMP
        // counts one per character, not one per UTF-16 code unit.
        (StrLen, Str(s)) => {
            Int(i32::try_from(s.chars().count()).map_err(|_| EvalError::Overflow)?)
        }
        _ => return Err(mismatch(op, &[operand])),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_arithmetic_faults() {
        let max = Value::Int(i32::MAX);
        assert_eq!(binary(OpCode::AddI32, &max, &Value::Int(1), true), Err(EvalError::Overflow));
        assert_eq!(
            binary(OpCode::AddI32, &max, &Value::Int(1), false),
            Ok(Value::Int(i32::MIN))
        );
    }

    #[test]
    fn division_faults_in_both_modes() {
        for checked in [true, false] {
            assert_eq!(
                binary(OpCode::DivI64, &Value::Long(1), &Value::Long(0), checked),
                Err(EvalError::DivideByZero)
            );
            assert_eq!(
                binary(OpCode::DivI32, &Value::Int(i32::MIN), &Value::Int(-1), checked),
                Err(EvalError::Overflow)
            );
        }
        assert_eq!(
            binary(OpCode::DivF64, &Value::Double(1.0), &Value::Double(0.0), true),
            Ok(Value::Double(f64::INFINITY))
        );
    }

    #[test]
    fn comparisons_and_equality() {
        assert_eq!(
            binary(OpCode::LtF64, &Value::Double(1.0), &Value::Double(2.0), true),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            binary(OpCode::Eq, &Value::from("a"), &Value::from("a"), true),
            Ok(Value::Bool(true))
        );
        assert!(matches!(
            binary(OpCode::Eq, &Value::Int(1), &Value::Long(1), true),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unary_ops() {
        assert_eq!(unary(OpCode::NegI32, &Value::Int(i32::MIN), true), Err(EvalError::Overflow));
        assert_eq!(unary(OpCode::ToStr, &Value::Bool(true), true), Ok(Value::from("True")));
        assert_eq!(unary(OpCode::StrLen, &Value::from("héllo"), true), Ok(Value::Int(5)));
        assert_eq!(unary(OpCode::StrLen, &Value::from("\u{1F600}a"), true), Ok(Value::Int(2)));
        assert_eq!(unary(OpCode::I32ToF64, &Value::Int(2), true), Ok(Value::Double(2.0)));
    }
}
