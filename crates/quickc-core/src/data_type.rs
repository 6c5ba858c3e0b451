//! The closed set of value types a compiled module can declare.

use std::fmt;

use crate::{TypeHash, Value};

/// A primitive data type.
///
/// Every field, local, parameter and return slot in the compiled language is
/// one of these. The discriminant doubles as the type tag in module images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Void = 0,
    Int = 1,
    Long = 2,
    Double = 3,
    Bool = 4,
    String = 5,
}

impl DataType {
    /// Keyword spelling in source (`int`, `string`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Void => "void",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Double => "double",
            DataType::Bool => "bool",
            DataType::String => "string",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "void" => DataType::Void,
            "int" => DataType::Int,
            "long" => DataType::Long,
            "double" => DataType::Double,
            "bool" => DataType::Bool,
            "string" => DataType::String,
            _ => return None,
        })
    }

    /// Image type tag.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => DataType::Void,
            1 => DataType::Int,
            2 => DataType::Long,
            3 => DataType::Double,
            4 => DataType::Bool,
            5 => DataType::String,
            _ => return None,
        })
    }

    #[inline]
    pub const fn is_void(self) -> bool {
        matches!(self, DataType::Void)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Long | DataType::Double)
    }

    #[inline]
    pub const fn is_integral(self) -> bool {
        matches!(self, DataType::Int | DataType::Long)
    }

    pub fn type_hash(self) -> TypeHash {
        TypeHash::from_name(self.name())
    }

    /// The value a field of this type holds before any initializer runs.
    ///
    /// Strings start empty; the language has no null.
    pub fn default_value(self) -> Value {
        match self {
            DataType::Void => Value::Void,
            DataType::Int => Value::Int(0),
            DataType::Long => Value::Long(0),
            DataType::Double => Value::Double(0.0),
            DataType::Bool => Value::Bool(false),
            DataType::String => Value::Str(String::new()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format a parameter list the way diagnostics and signatures print it.
pub fn format_params(params: &[DataType]) -> String {
    params
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}
