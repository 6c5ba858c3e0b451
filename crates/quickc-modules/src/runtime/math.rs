//! `System.Math`.

use quickc_core::{CallContext, DataType, NativeError};

use crate::Library;

pub(super) fn register(lib: &mut Library) {
    use DataType::{Double, Int, Long};

    lib.class("System", "Math")
        .constant("PI", std::f64::consts::PI)
        .constant("E", std::f64::consts::E)
        .function("Abs", &[Int], Int, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_int(0)?;
            ctx.set_return(v.checked_abs().ok_or(NativeError::Overflow)?);
            Ok(())
        })
        .function("Abs", &[Long], Long, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_long(0)?;
            ctx.set_return(v.checked_abs().ok_or(NativeError::Overflow)?);
            Ok(())
        })
        .function("Abs", &[Double], Double, |ctx: &mut CallContext<'_>| {
            let v = ctx.arg_double(0)?;
            ctx.set_return(v.abs());
            Ok(())
        })
        .function("Max", &[Int, Int], Int, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_int(0)?, ctx.arg_int(1)?);
            ctx.set_return(a.max(b));
            Ok(())
        })
        .function("Max", &[Long, Long], Long, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_long(0)?, ctx.arg_long(1)?);
            ctx.set_return(a.max(b));
            Ok(())
        })
        .function("Max", &[Double, Double], Double, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_double(0)?, ctx.arg_double(1)?);
            ctx.set_return(if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) });
            Ok(())
        })
        .function("Min", &[Int, Int], Int, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_int(0)?, ctx.arg_int(1)?);
            ctx.set_return(a.min(b));
            Ok(())
        })
        .function("Min", &[Long, Long], Long, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_long(0)?, ctx.arg_long(1)?);
            ctx.set_return(a.min(b));
            Ok(())
        })
        .function("Min", &[Double, Double], Double, |ctx: &mut CallContext<'_>| {
            let (a, b) = (ctx.arg_double(0)?, ctx.arg_double(1)?);
            ctx.set_return(if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) });
            Ok(())
        })
        .function("Sqrt", &[Double], Double, unary(f64::sqrt))
        .function("Floor", &[Double], Double, unary(f64::floor))
        .function("Ceiling", &[Double], Double, unary(f64::ceil))
        .function("Round", &[Double], Double, unary(f64::round_ties_even))
        .function("Pow", &[Double, Double], Double, |ctx: &mut CallContext<'_>| {
            let (x, y) = (ctx.arg_double(0)?, ctx.arg_double(1)?);
            ctx.set_return(x.powf(y));
            Ok(())
        });
}

fn unary(
    f: fn(f64) -> f64,
) -> impl Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static {
    move |ctx| {
        let x = ctx.arg_double(0)?;
        ctx.set_return(f(x));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quickc_core::{NativeError, Value};

    use crate::runtime::{library, testing::call};

    #[test]
    fn abs_of_min_value_overflows() {
        let lib = library();
        assert_eq!(
            call(&lib, "System.Math", "Abs", &[Value::Int(i32::MIN)]),
            Err(NativeError::Overflow)
        );
        assert_eq!(call(&lib, "System.Math", "Abs", &[Value::Int(-4)]), Ok(Value::Int(4)));
    }

    #[test]
    fn overloads_dispatch_by_type() {
        let lib = library();
        assert_eq!(
            call(&lib, "System.Math", "Max", &[Value::Long(3), Value::Long(9)]),
            Ok(Value::Long(9))
        );
        assert_eq!(
            call(&lib, "System.Math", "Pow", &[Value::Double(2.0), Value::Double(10.0)]),
            Ok(Value::Double(1024.0))
        );
    }

    #[test]
    fn round_is_bankers_rounding() {
        let lib = library();
        assert_eq!(call(&lib, "System.Math", "Round", &[Value::Double(2.5)]), Ok(Value::Double(2.0)));
        assert_eq!(call(&lib, "System.Math", "Round", &[Value::Double(3.5)]), Ok(Value::Double(4.0)));
    }

    #[test]
    fn max_propagates_nan() {
        let lib = library();
        let result = call(&lib, "System.Math", "Max", &[Value::Double(f64::NAN), Value::Double(1.0)]).unwrap();
        assert!(result.as_double().unwrap().is_nan());
    }
}
