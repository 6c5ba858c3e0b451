//! `System.Linq`: sequence operators over the characters of a string.

use quickc_core::{CallContext, DataType, NativeError};
use rustc_hash::FxHashSet;

use crate::Library;

pub const LIBRARY_NAME: &str = "System.Linq";

pub fn library() -> Library {
    use DataType::{Bool, Int, String};

    let mut lib = Library::new(LIBRARY_NAME);
    lib.class("System.Linq", "Enumerable")
        .function("Count", &[String], Int, |ctx: &mut CallContext<'_>| {
            let count = ctx.arg_str(0)?.chars().count();
            ctx.set_return(i32::try_from(count).map_err(|_| NativeError::Overflow)?);
            Ok(())
        })
        .function("Any", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let any = !ctx.arg_str(0)?.is_empty();
            ctx.set_return(any);
            Ok(())
        })
        .function("Reverse", &[String], String, |ctx: &mut CallContext<'_>| {
            let reversed: std::string::String = ctx.arg_str(0)?.chars().rev().collect();
            ctx.set_return(reversed);
            Ok(())
        })
        .function("Distinct", &[String], String, |ctx: &mut CallContext<'_>| {
            let distinct = distinct(ctx.arg_str(0)?);
            ctx.set_return(distinct);
            Ok(())
        });
    lib
}

/// First occurrences, in order.
fn distinct(input: &str) -> String {
    let mut seen = FxHashSet::default();
    input.chars().filter(|c| seen.insert(*c)).collect()
}

#[cfg(test)]
mod tests {
    use quickc_core::Value;

    use super::*;

    fn call(name: &str, arg: &str) -> Value {
        let lib = library();
        let class = lib.find_class("System.Linq.Enumerable").unwrap();
        let function = class.functions_named(name).next().unwrap();
        let args = [Value::from(arg)];
        let mut out = Vec::new();
        let mut ctx = CallContext::new(&args, &mut out);
        function.func.call(&mut ctx).unwrap();
        ctx.take_return()
    }

    #[test]
    fn operators_work_on_chars() {
        assert_eq!(call("Count", "héllo"), Value::Int(5));
        assert_eq!(call("Any", ""), Value::Bool(false));
        assert_eq!(call("Reverse", "abc"), Value::from("cba"));
        assert_eq!(call("Distinct", "mississippi"), Value::from("misp"));
    }
}
