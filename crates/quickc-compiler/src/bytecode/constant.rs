//! Constant pool for compiled modules.

use quickc_core::{DataType, Value};
use rustc_hash::FxHashMap;

/// Values referenced by `CONSTANT` instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
}

impl Constant {
    /// The constant for a literal or folded value. Void and booleans have
    /// dedicated instructions and no pool entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Int(v) => Constant::Int(*v),
            Value::Long(v) => Constant::Long(*v),
            Value::Double(v) => Constant::Double(*v),
            Value::Str(s) => Constant::Str(s.clone()),
            Value::Bool(_) | Value::Void => return None,
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Constant::Int(v) => Value::Int(*v),
            Constant::Long(v) => Value::Long(*v),
            Constant::Double(v) => Value::Double(*v),
            Constant::Str(s) => Value::Str(s.clone()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Constant::Int(_) => DataType::Int,
            Constant::Long(_) => DataType::Long,
            Constant::Double(_) => DataType::Double,
            Constant::Str(_) => DataType::String,
        }
    }
}

/// Hashable form of a [`Constant`]; doubles compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Int(i32),
    Long(i64),
    Double(u64),
    Str(String),
}

impl From<&Constant> for ConstantKey {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Int(v) => ConstantKey::Int(*v),
            Constant::Long(v) => ConstantKey::Long(*v),
            Constant::Double(v) => ConstantKey::Double(v.to_bits()),
            Constant::Str(s) => ConstantKey::Str(s.clone()),
        }
    }
}

/// Module-level constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, u32>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or find a constant, returning its index.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = ConstantKey::from(&constant);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn into_vec(self) -> Vec<Constant> {
        self.constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_identical_constants() {
        let mut pool = ConstantPool::new();
        let a = pool.add(Constant::Str("hello".into()));
        let b = pool.add(Constant::Int(1));
        let c = pool.add(Constant::Str("hello".into()));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn same_number_different_types_stay_distinct() {
        let mut pool = ConstantPool::new();
        let int = pool.add(Constant::Int(1));
        let long = pool.add(Constant::Long(1));
        let double = pool.add(Constant::Double(1.0));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(long), Some(&Constant::Long(1)));
        assert_ne!(int, double);
    }

    #[test]
    fn negative_zero_is_not_zero() {
        let mut pool = ConstantPool::new();
        pool.add(Constant::Double(0.0));
        pool.add(Constant::Double(-0.0));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn values_convert_both_ways() {
        let constant = Constant::from_value(&Value::Long(5)).unwrap();
        assert_eq!(constant.to_value(), Value::Long(5));
        assert_eq!(constant.data_type(), DataType::Long);
        assert!(Constant::from_value(&Value::Bool(true)).is_none());
    }
}
