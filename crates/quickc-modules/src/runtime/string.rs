//! `System.String`: static helpers and the instance methods of `string`.
//!
//! Positions and lengths count `char`s (Unicode scalar values), never
//! UTF-16 code units, so a supplementary-plane character is one position.

use quickc_core::{CallContext, DataType, NativeError};

use crate::Library;

pub(super) fn register(lib: &mut Library) {
    use DataType::{Bool, Int, String};

    lib.class("System", "String")
        .keyword(String)
        .constant("Empty", "")
        .function("IsNullOrEmpty", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let empty = ctx.arg_str(0)?.is_empty();
            ctx.set_return(empty);
            Ok(())
        })
        .function("IsNullOrWhiteSpace", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let blank = ctx.arg_str(0)?.trim().is_empty();
            ctx.set_return(blank);
            Ok(())
        })
        .function("Concat", &[String, String], String, concat)
        .function("Concat", &[String, String, String], String, concat)
        .function("Concat", &[String, String, String, String], String, concat)
        .method("ToUpper", &[], String, map(str::to_uppercase))
        .method("ToLower", &[], String, map(str::to_lowercase))
        .method("Trim", &[], String, map(|s| s.trim().to_string()))
        .method("Contains", &[String], Bool, test(|s, p| s.contains(p)))
        .method("StartsWith", &[String], Bool, test(|s, p| s.starts_with(p)))
        .method("EndsWith", &[String], Bool, test(|s, p| s.ends_with(p)))
        .method("IndexOf", &[String], Int, |ctx: &mut CallContext<'_>| {
            let (s, needle) = (ctx.arg_str(0)?, ctx.arg_str(1)?);
            let index = match s.find(needle) {
                Some(byte) => char_count(&s[..byte])?,
                None => -1,
            };
            ctx.set_return(index);
            Ok(())
        })
        .method("Substring", &[Int], String, |ctx: &mut CallContext<'_>| {
            let s = ctx.arg_str(0)?;
            let start = index_arg(ctx, 1, "startIndex")?;
            let len = s.chars().count();
            if start > len {
                return Err(out_of_range("startIndex"));
            }
            let result: std::string::String = s.chars().skip(start).collect();
            ctx.set_return(result);
            Ok(())
        })
        .method("Substring", &[Int, Int], String, |ctx: &mut CallContext<'_>| {
            let s = ctx.arg_str(0)?;
            let start = index_arg(ctx, 1, "startIndex")?;
            let count = index_arg(ctx, 2, "length")?;
            if start.checked_add(count).is_none_or(|end| end > s.chars().count()) {
                return Err(out_of_range("length"));
            }
            let result: std::string::String = s.chars().skip(start).take(count).collect();
            ctx.set_return(result);
            Ok(())
        })
        .method("Replace", &[String, String], String, |ctx: &mut CallContext<'_>| {
            let (s, from, to) = (ctx.arg_str(0)?, ctx.arg_str(1)?, ctx.arg_str(2)?);
            if from.is_empty() {
                return Err(NativeError::InvalidArgument(
                    "string cannot be of zero length (parameter 'oldValue')".into(),
                ));
            }
            let result = s.replace(from, to);
            ctx.set_return(result);
            Ok(())
        });
}

fn concat(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
    let mut result = std::string::String::new();
    for i in 0..ctx.arg_count() {
        result.push_str(ctx.arg_str(i)?);
    }
    ctx.set_return(result);
    Ok(())
}

fn map(
    f: fn(&str) -> std::string::String,
) -> impl Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static {
    move |ctx| {
        let result = f(ctx.arg_str(0)?);
        ctx.set_return(result);
        Ok(())
    }
}

fn test(
    f: fn(&str, &str) -> bool,
) -> impl Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static {
    move |ctx| {
        let result = f(ctx.arg_str(0)?, ctx.arg_str(1)?);
        ctx.set_return(result);
        Ok(())
    }
}

fn char_count(s: &str) -> Result<i32, NativeError> {
    i32::try_from(s.chars().count()).map_err(|_| NativeError::Overflow)
}

fn index_arg(ctx: &CallContext<'_>, index: usize, name: &str) -> Result<usize, NativeError> {
    usize::try_from(ctx.arg_int(index)?).map_err(|_| out_of_range(name))
}

fn out_of_range(name: &str) -> NativeError {
    NativeError::InvalidArgument(format!(
        "index and length must refer to a location within the string (parameter '{name}')"
    ))
}

#[cfg(test)]
mod tests {
    use quickc_core::{NativeError, Value};

    use crate::runtime::{library, testing::call};

    const STRING: &str = "System.String";

    #[test]
    fn static_helpers() {
        let lib = library();
        assert_eq!(call(&lib, STRING, "IsNullOrEmpty", &["".into()]), Ok(Value::Bool(true)));
        assert_eq!(call(&lib, STRING, "IsNullOrWhiteSpace", &[" \t".into()]), Ok(Value::Bool(true)));
        assert_eq!(
            call(&lib, STRING, "Concat", &["a".into(), "b".into(), "c".into()]),
            Ok(Value::from("abc"))
        );
    }

    #[test]
    fn instance_methods_take_the_receiver_first() {
        let lib = library();
        assert_eq!(call(&lib, STRING, "ToUpper", &["hi".into()]), Ok(Value::from("HI")));
        assert_eq!(
            call(&lib, STRING, "IndexOf", &["héllo".into(), "llo".into()]),
            Ok(Value::Int(2))
        );
        assert_eq!(call(&lib, STRING, "IndexOf", &["abc".into(), "z".into()]), Ok(Value::Int(-1)));
        assert_eq!(
            call(&lib, STRING, "Substring", &["Hello World".into(), Value::Int(6)]),
            Ok(Value::from("World"))
        );
        assert_eq!(
            call(&lib, STRING, "Substring", &["Hello".into(), Value::Int(1), Value::Int(3)]),
            Ok(Value::from("ell"))
        );
    }

    #[test]
    fn positions_count_scalar_values() {
        let lib = library();
        let text = Value::from("\u{1F600}ab");
        assert_eq!(
            call(&lib, STRING, "IndexOf", &[text.clone(), "b".into()]),
            Ok(Value::Int(2))
        );
        assert_eq!(
            call(&lib, STRING, "Substring", &[text, Value::Int(1)]),
            Ok(Value::from("ab"))
        );
    }

    #[test]
    fn substring_out_of_range_fails() {
        let lib = library();
        assert!(matches!(
            call(&lib, STRING, "Substring", &["abc".into(), Value::Int(4)]),
            Err(NativeError::InvalidArgument(_))
        ));
        assert!(matches!(
            call(&lib, STRING, "Substring", &["abc".into(), Value::Int(-1)]),
            Err(NativeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn replace_rejects_empty_pattern() {
        let lib = library();
        assert_eq!(
            call(&lib, STRING, "Replace", &["aXa".into(), "X".into(), "-".into()]),
            Ok(Value::from("a-a"))
        );
        assert!(call(&lib, STRING, "Replace", &["a".into(), "".into(), "-".into()]).is_err());
    }
}
