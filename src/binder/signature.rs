use std::fmt;

use quickc_core::{DataType, Value, format_params};

/// A Rust type with a script counterpart.
pub trait ScriptType: Sized {
    const DATA_TYPE: DataType;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! script_type {
    ($ty:ty, $data:ident, $variant:ident) => {
        impl ScriptType for $ty {
            const DATA_TYPE: DataType = DataType::$data;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl ScriptReturn for $ty {
            const DATA_TYPE: DataType = DataType::$data;

            fn from_value(value: Value) -> Option<Self> {
                <$ty as ScriptType>::from_value(value)
            }
        }
    };
}

/// What a bound call returns: `()` for void methods, otherwise a [`ScriptType`].
pub trait ScriptReturn: Sized {
    const DATA_TYPE: DataType;

    fn from_value(value: Value) -> Option<Self>;
}

impl ScriptReturn for () {
    const DATA_TYPE: DataType = DataType::Void;

    fn from_value(value: Value) -> Option<Self> {
        value.is_void().then_some(())
    }
}

script_type!(i32, Int, Int);
script_type!(i64, Long, Long);
script_type!(f64, Double, Double);
script_type!(bool, Bool, Bool);
script_type!(String, String, Str);

/// The argument list of a bound call, as a tuple.
pub trait ScriptArgs {
    fn types() -> Vec<DataType>;

    fn into_values(self) -> Vec<Value>;
}

macro_rules! script_args {
    ($($name:ident),*) => {
        impl<$($name: ScriptType),*> ScriptArgs for ($($name,)*) {
            fn types() -> Vec<DataType> {
                vec![$($name::DATA_TYPE),*]
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)*) = self;
                vec![$($name.into_value()),*]
            }
        }
    };
}

script_args!();
script_args!(A);
script_args!(A, B);
script_args!(A, B, C);
script_args!(A, B, C, D);

/// Parameter and return types a method is bound by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub params: Vec<DataType>,
    pub return_type: DataType,
}

impl MethodSignature {
    pub fn new(params: impl Into<Vec<DataType>>, return_type: DataType) -> Self {
        Self {
            params: params.into(),
            return_type,
        }
    }

    /// The signature named by a Rust argument tuple and return type.
    pub fn of<Args: ScriptArgs, Ret: ScriptReturn>() -> Self {
        Self::new(Args::types(), Ret::DATA_TYPE)
    }

    /// `int Add(int, int)`
    pub fn describe(&self, name: &str) -> String {
        format!("{} {}({})", self.return_type, name, format_params(&self.params))
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -> {}", format_params(&self.params), self.return_type)
    }
}
