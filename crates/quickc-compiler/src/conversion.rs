//! Implicit conversions between primitive types.
//!
//! The only implicit conversions are the numeric widenings
//! `int -> long`, `int -> double` and `long -> double`.

use quickc_core::{DataType, Value};

use crate::bytecode::OpCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    /// Widen with the given instruction.
    Widen(OpCode),
}

impl Conversion {
    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }

    pub fn op(self) -> Option<OpCode> {
        match self {
            Conversion::Identity => None,
            Conversion::Widen(op) => Some(op),
        }
    }
}

/// The implicit conversion from `from` to `to`, if there is one.
pub fn implicit(from: DataType, to: DataType) -> Option<Conversion> {
    use DataType::*;
    match (from, to) {
        _ if from == to && !from.is_void() => Some(Conversion::Identity),
        (Int, Long) => Some(Conversion::Widen(OpCode::I32ToI64)),
        (Int, Double) => Some(Conversion::Widen(OpCode::I32ToF64)),
        (Long, Double) => Some(Conversion::Widen(OpCode::I64ToF64)),
        _ => None,
    }
}

pub fn is_implicitly_convertible(from: DataType, to: DataType) -> bool {
    implicit(from, to).is_some()
}

/// The type both numeric operands of a binary operator are widened to.
pub fn numeric_promotion(left: DataType, right: DataType) -> Option<DataType> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    if is_implicitly_convertible(left, right) {
        Some(right)
    } else {
        Some(left)
    }
}

/// Whether converting to `a` is a better match than converting to `b` for
/// an argument of type `arg`.
pub fn is_better_conversion(arg: DataType, a: DataType, b: DataType) -> bool {
    if a == b {
        return false;
    }
    if arg == a {
        return true;
    }
    if arg == b {
        return false;
    }
    is_implicitly_convertible(a, b)
}

/// Apply an implicit conversion to a compile-time constant.
pub fn convert_constant(value: &Value, to: DataType) -> Option<Value> {
    match (value, to) {
        (v, to) if v.data_type() == to => Some(v.clone()),
        (Value::Int(i), DataType::Long) => Some(Value::Long(i64::from(*i))),
        (Value::Int(i), DataType::Double) => Some(Value::Double(f64::from(*i))),
        (Value::Long(l), DataType::Double) => Some(Value::Double(*l as f64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataType::*;

    #[test]
    fn widenings_only() {
        assert_eq!(implicit(Int, Int), Some(Conversion::Identity));
        assert_eq!(implicit(Int, Long), Some(Conversion::Widen(OpCode::I32ToI64)));
        assert_eq!(implicit(Long, Double), Some(Conversion::Widen(OpCode::I64ToF64)));
        assert_eq!(implicit(Long, Int), None);
        assert_eq!(implicit(Int, String), None);
        assert_eq!(implicit(Bool, Int), None);
        assert_eq!(implicit(Void, Void), None);
    }

    #[test]
    fn promotion_picks_the_wider_type() {
        assert_eq!(numeric_promotion(Int, Int), Some(Int));
        assert_eq!(numeric_promotion(Int, Long), Some(Long));
        assert_eq!(numeric_promotion(Double, Long), Some(Double));
        assert_eq!(numeric_promotion(Int, Bool), None);
    }

    #[test]
    fn identity_beats_widening() {
        assert!(is_better_conversion(Int, Int, Long));
        assert!(is_better_conversion(Int, Long, Double));
        assert!(!is_better_conversion(Int, Double, Long));
        assert!(!is_better_conversion(Long, Long, Long));
    }

    #[test]
    fn constants_widen() {
        assert_eq!(convert_constant(&Value::Int(2), Long), Some(Value::Long(2)));
        assert_eq!(convert_constant(&Value::Long(3), Double), Some(Value::Double(3.0)));
        assert_eq!(convert_constant(&Value::Double(1.0), Int), None);
    }
}
