//! `System.Text.RegularExpressions.Regex`, backed by the `regex` crate.

use quickc_core::{CallContext, DataType, NativeError};
use ::regex::Regex;

use crate::Library;

pub(super) fn register(lib: &mut Library) {
    use DataType::{Bool, String};

    lib.class("System.Text.RegularExpressions", "Regex")
        .function("IsMatch", &[String, String], Bool, |ctx: &mut CallContext<'_>| {
            let regex = compile(ctx.arg_str(1)?)?;
            let matched = regex.is_match(ctx.arg_str(0)?);
            ctx.set_return(matched);
            Ok(())
        })
        .function("Replace", &[String, String, String], String, |ctx: &mut CallContext<'_>| {
            let regex = compile(ctx.arg_str(1)?)?;
            let result = regex.replace_all(ctx.arg_str(0)?, ctx.arg_str(2)?).into_owned();
            ctx.set_return(result);
            Ok(())
        })
        .function("Match", &[String, String], String, |ctx: &mut CallContext<'_>| {
            let regex = compile(ctx.arg_str(1)?)?;
            let found = regex
                .find(ctx.arg_str(0)?)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            ctx.set_return(found);
            Ok(())
        })
        .function("Escape", &[String], String, |ctx: &mut CallContext<'_>| {
            let escaped = ::regex::escape(ctx.arg_str(0)?);
            ctx.set_return(escaped);
            Ok(())
        });
}

fn compile(pattern: &str) -> Result<Regex, NativeError> {
    Regex::new(pattern).map_err(|e| {
        NativeError::InvalidArgument(format!("invalid pattern '{pattern}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use quickc_core::{NativeError, Value};

    use crate::runtime::{library, testing::call};

    const REGEX: &str = "System.Text.RegularExpressions.Regex";

    #[test]
    fn match_and_replace() {
        let lib = library();
        assert_eq!(
            call(&lib, REGEX, "IsMatch", &["abc123".into(), r"\d+$".into()]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call(&lib, REGEX, "Replace", &["2024-01-05".into(), r"(\d+)-(\d+)-(\d+)".into(), "$3/$2/$1".into()]),
            Ok(Value::from("05/01/2024"))
        );
        assert_eq!(
            call(&lib, REGEX, "Match", &["id=42;".into(), r"\d+".into()]),
            Ok(Value::from("42"))
        );
    }

    #[test]
    fn invalid_pattern_is_a_native_error() {
        let lib = library();
        assert!(matches!(
            call(&lib, REGEX, "IsMatch", &["x".into(), "(".into()]),
            Err(NativeError::InvalidArgument(_))
        ));
    }
}
