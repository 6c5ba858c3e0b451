//! The classes behind the keyword types: `System.Int32` (`int`),
//! `System.Int64` (`long`), `System.Double` (`double`) and
//! `System.Boolean` (`bool`).

use quickc_core::{CallContext, DataType};

use super::convert::{parse_bool, parse_double, parse_integer};
use crate::Library;

pub(super) fn register(lib: &mut Library) {
    use DataType::{Bool, Double, Int, Long, String};

    lib.class("System", "Int32")
        .keyword(Int)
        .constant("MaxValue", i32::MAX)
        .constant("MinValue", i32::MIN)
        .function("Parse", &[String], Int, |ctx: &mut CallContext<'_>| {
            let v = parse_integer::<i32>(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        });

    lib.class("System", "Int64")
        .keyword(Long)
        .constant("MaxValue", i64::MAX)
        .constant("MinValue", i64::MIN)
        .function("Parse", &[String], Long, |ctx: &mut CallContext<'_>| {
            let v = parse_integer::<i64>(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        });

    lib.class("System", "Double")
        .keyword(Double)
        .constant("MaxValue", f64::MAX)
        .constant("MinValue", f64::MIN)
        .constant("Epsilon", f64::from_bits(1))
        .constant("PositiveInfinity", f64::INFINITY)
        .constant("NegativeInfinity", f64::NEG_INFINITY)
        .constant("NaN", f64::NAN)
        .function("Parse", &[String], Double, |ctx: &mut CallContext<'_>| {
            let v = parse_double(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        })
        .function("IsNaN", &[Double], Bool, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_double(0)?.is_nan();
            ctx.set_return(v);
            Ok(())
        })
        .function("IsInfinity", &[Double], Bool, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_double(0)?.is_infinite();
            ctx.set_return(v);
            Ok(())
        });

    lib.class("System", "Boolean")
        .keyword(Bool)
        .constant("TrueString", "True")
        .constant("FalseString", "False")
        .function("Parse", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let v = parse_bool(ctx.arg_str(0)?)?;
            ctx.set_return(v);
            Ok(())
        });
}
