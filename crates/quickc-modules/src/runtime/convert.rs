//! `System.Convert`.

use std::num::IntErrorKind;
use std::str::FromStr;

use quickc_core::{CallContext, DataType, NativeError, Value};

use crate::Library;

pub(super) fn register(lib: &mut Library) {
    use DataType::{Bool, Double, Int, Long, String};

    lib.class("System", "Convert")
        .function("ToInt32", &[String], Int, |ctx: &mut CallContext<'_>| {
            let v = parse_integer::<i32>(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToInt32", &[Long], Int, |ctx: &mut CallContext<'_>| {
            let v = i32::try_from(ctx.arg_long(0)?).map_err(|_| NativeError::Overflow)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToInt32", &[Double], Int, |ctx: &mut CallContext<'_>| {
            let v = round_to_int(ctx.arg_double(0)?, 2_147_483_648.0)?;
            ctx.set_return(v as i32);
            Ok(())
        })
        .function("ToInt32", &[Bool], Int, |ctx: &mut CallContext<'_>| {
            let v = i32::from(ctx.arg_bool(0)?);
            ctx.set_return(v);
            Ok(())
        })
        .function("ToInt64", &[String], Long, |ctx: &mut CallContext<'_>| {
            let v = parse_integer::<i64>(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToInt64", &[Int], Long, |ctx: &mut CallContext<'_>| {
            let v = i64::from(ctx.arg_int(0)?);
            ctx.set_return(v);
            Ok(())
        })
        .function("ToInt64", &[Double], Long, |ctx: &mut CallContext<'_>| {
            let v = round_to_int(ctx.arg_double(0)?, 9_223_372_036_854_775_808.0)?;
            ctx.set_return(v as i64);
            Ok(())
        })
        .function("ToDouble", &[String], Double, |ctx: &mut CallContext<'_>| {
            let v = parse_double(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToDouble", &[Int], Double, |ctx: &mut CallContext<'_>| {
            let v = f64::from(ctx.arg_int(0)?);
            ctx.set_return(v);
            Ok(())
        })
        .function("ToDouble", &[Long], Double, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_long(0)? as f64;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToBoolean", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let v = parse_bool(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("ToString", &[Int], String, to_string)
        .function("ToString", &[Long], String, to_string)
        .function("ToString", &[Double], String, to_string)
        .function("ToString", &[Bool], String, to_string);
}

fn to_string(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
    let text = ctx.arg(0)?.to_string();
    ctx.set_return(Value::Str(text));
    Ok(())
}

/// Parse an integer the way `Int32.Parse` does: surrounding whitespace and a
/// leading sign are accepted.
pub(super) fn parse_integer<T>(text: &str) -> Result<T, NativeError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    text.trim().parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => NativeError::Overflow,
        _ => NativeError::Format(text.to_string()),
    })
}

pub(super) fn parse_double(text: &str) -> Result<f64, NativeError> {
    let trimmed = text.trim();
    match trimmed {
        "Infinity" | "∞" => Ok(f64::INFINITY),
        "-Infinity" | "-∞" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) => {
            Err(NativeError::Format(text.to_string()))
        }
        _ => trimmed
            .parse::<f64>()
            .map_err(|_| NativeError::Format(text.to_string())),
    }
}

pub(super) fn parse_bool(text: &str) -> Result<bool, NativeError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(NativeError::Format(text.to_string()))
    }
}

/// Round half to even, then check the result lies in `[-limit, limit)`.
///
/// `limit` is the power of two one past the target type's maximum, which is
/// exactly representable as a double.
fn round_to_int(value: f64, limit: f64) -> Result<f64, NativeError> {
    let rounded = value.round_ties_even();
    if rounded >= -limit && rounded < limit {
        Ok(rounded)
    } else {
        Err(NativeError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::{NativeError, Value};

    use super::*;
    use crate::runtime::{library, testing::call};

    const CONVERT: &str = "System.Convert";

    #[test]
    fn parses_with_whitespace_and_sign() {
        assert_eq!(parse_integer::<i32>("  -42 "), Ok(-42));
        assert_eq!(parse_integer::<i32>("+7"), Ok(7));
        assert_eq!(parse_integer::<i32>("2147483648"), Err(NativeError::Overflow));
        assert_eq!(parse_integer::<i32>("12a"), Err(NativeError::Format("12a".into())));
    }

    #[test]
    fn double_to_int_rounds_half_to_even() {
        let lib = library();
        assert_eq!(call(&lib, CONVERT, "ToInt32", &[Value::Double(2.5)]), Ok(Value::Int(2)));
        assert_eq!(call(&lib, CONVERT, "ToInt32", &[Value::Double(-3.5)]), Ok(Value::Int(-4)));
        assert_eq!(
            call(&lib, CONVERT, "ToInt32", &[Value::Double(3e9)]),
            Err(NativeError::Overflow)
        );
        assert_eq!(
            call(&lib, CONVERT, "ToInt32", &[Value::Double(f64::NAN)]),
            Err(NativeError::Overflow)
        );
        assert_eq!(
            call(&lib, CONVERT, "ToInt64", &[Value::Double(1e19)]),
            Err(NativeError::Overflow)
        );
    }

    #[test]
    fn narrowing_long_is_checked() {
        let lib = library();
        assert_eq!(
            call(&lib, CONVERT, "ToInt32", &[Value::Long(1 << 40)]),
            Err(NativeError::Overflow)
        );
        assert_eq!(call(&lib, CONVERT, "ToInt32", &[Value::Long(-5)]), Ok(Value::Int(-5)));
    }

    #[test]
    fn to_string_and_bool_parsing() {
        let lib = library();
        assert_eq!(call(&lib, CONVERT, "ToString", &[Value::Bool(false)]), Ok(Value::from("False")));
        assert_eq!(call(&lib, CONVERT, "ToBoolean", &[" TRUE ".into()]), Ok(Value::Bool(true)));
        assert!(call(&lib, CONVERT, "ToBoolean", &["yes".into()]).is_err());
    }

    #[test]
    fn double_parsing_rejects_rust_only_spellings() {
        assert_eq!(parse_double("1.5e3"), Ok(1500.0));
        assert_eq!(parse_double("Infinity"), Ok(f64::INFINITY));
        assert!(parse_double("inf").is_err());
    }
}
