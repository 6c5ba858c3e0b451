//! `System.Runtime`: the core runtime library.
//!
//! | Namespace | Classes |
//! |---|---|
//! | `System` | `Console`, `Math`, `String`, `Convert`, `Int32`, `Int64`, `Double`, `Boolean` |
//! | `System.IO` | `Path` |
//! | `System.Text` | |
//! | `System.Collections.Generic` | |
//! | `System.Text.RegularExpressions` | `Regex` |

mod console;
mod convert;
mod math;
mod path;
mod primitives;
mod regex;
mod string;

use crate::Library;

pub const LIBRARY_NAME: &str = "System.Runtime";

pub fn library() -> Library {
    let mut lib = Library::new(LIBRARY_NAME);
    console::register(&mut lib);
    math::register(&mut lib);
    string::register(&mut lib);
    convert::register(&mut lib);
    primitives::register(&mut lib);
    path::register(&mut lib);
    regex::register(&mut lib);
    lib.namespace("System.Text");
    lib.namespace("System.Collections.Generic");
    lib
}

#[cfg(test)]
pub(crate) mod testing {
    use quickc_core::{CallContext, NativeError, Value};

    use crate::Library;

    /// Call `class.name` with `args`, picking the overload whose parameter
    /// types match the argument values.
    pub fn call(lib: &Library, class: &str, name: &str, args: &[Value]) -> Result<Value, NativeError> {
        call_with_output(lib, class, name, args).map(|(value, _)| value)
    }

    pub fn call_with_output(
        lib: &Library,
        class: &str,
        name: &str,
        args: &[Value],
    ) -> Result<(Value, String), NativeError> {
        let class = lib
            .find_class(class)
            .unwrap_or_else(|| panic!("no class {class}"));
        let function = class
            .functions()
            .iter()
            .find(|f| {
                f.name == name
                    && f.arity() == args.len()
                    && (!f.is_instance || args[0].data_type() == class.keyword.unwrap())
                    && f.params
                        .iter()
                        .zip(&args[usize::from(f.is_instance)..])
                        .all(|(p, a)| *p == a.data_type())
            })
            .unwrap_or_else(|| panic!("no overload {name} for {args:?}"));

        let mut out = Vec::new();
        let mut ctx = CallContext::new(args, &mut out);
        function.func.call(&mut ctx)?;
        let value = ctx.take_return();
        Ok((value, String::from_utf8(out).unwrap()))
    }
}
