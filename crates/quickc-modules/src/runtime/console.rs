//! `System.Console`: text output to the calling instance's output sink.

use quickc_core::{CallContext, DataType, NativeError};

use crate::Library;

const PRINTABLE: [DataType; 5] = [
    DataType::String,
    DataType::Int,
    DataType::Long,
    DataType::Double,
    DataType::Bool,
];

pub(super) fn register(lib: &mut Library) {
    let mut console = lib
        .class("System", "Console")
        .function("WriteLine", &[], DataType::Void, |ctx: &mut CallContext<'_>| {
            ctx.write_output("\n")
        });

    for ty in PRINTABLE {
        console = console
            .function("WriteLine", &[ty], DataType::Void, write_line)
            .function("Write", &[ty], DataType::Void, write);
    }
}

fn write(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
    let text = ctx.arg(0)?.to_string();
    ctx.write_output(&text)
}

fn write_line(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
    let mut text = ctx.arg(0)?.to_string();
    text.push('\n');
    ctx.write_output(&text)
}

#[cfg(test)]
mod tests {
    use quickc_core::Value;

    use crate::runtime::{library, testing::call_with_output};

    #[test]
    fn write_line_formats_like_to_string() {
        let lib = library();
        let (_, out) = call_with_output(&lib, "System.Console", "WriteLine", &[Value::Bool(true)]).unwrap();
        assert_eq!(out, "True\n");
        let (_, out) = call_with_output(&lib, "System.Console", "Write", &[Value::Double(0.5)]).unwrap();
        assert_eq!(out, "0.5");
        let (_, out) = call_with_output(&lib, "System.Console", "WriteLine", &[]).unwrap();
        assert_eq!(out, "\n");
    }
}
