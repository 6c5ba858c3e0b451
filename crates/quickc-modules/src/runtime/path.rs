//! `System.IO.Path`, with `/` as the directory separator.

use quickc_core::{CallContext, DataType, NativeError};

use crate::Library;

const SEPARATOR: char = '/';

pub(super) fn register(lib: &mut Library) {
    use DataType::{Bool, String};

    lib.class("System.IO", "Path")
        .function("Combine", &[String, String], String, combine_all)
        .function("Combine", &[String, String, String], String, combine_all)
        .function("GetFileName", &[String], String, map(file_name))
        .function("GetExtension", &[String], String, map(extension))
        .function("GetFileNameWithoutExtension", &[String], String, map(file_stem))
        .function("GetDirectoryName", &[String], String, map(directory_name))
        .function("HasExtension", &[String], Bool, |ctx: &mut CallContext<'_>| {
            let has = !extension(ctx.arg_str(0)?).is_empty();
            ctx.set_return(has);
            Ok(())
        });
}

fn map(
    f: fn(&str) -> &str,
) -> impl Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static {
    move |ctx| {
        let result = f(ctx.arg_str(0)?).to_string();
        ctx.set_return(result);
        Ok(())
    }
}

fn combine_all(ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
    let mut path = String::new();
    for i in 0..ctx.arg_count() {
        path = combine(&path, ctx.arg_str(i)?);
    }
    ctx.set_return(path);
    Ok(())
}

/// A rooted second part replaces the first.
fn combine(first: &str, second: &str) -> String {
    if second.starts_with(SEPARATOR) || first.is_empty() {
        return second.to_string();
    }
    if second.is_empty() {
        return first.to_string();
    }
    if first.ends_with(SEPARATOR) {
        format!("{first}{second}")
    } else {
        format!("{first}{SEPARATOR}{second}")
    }
}

fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[i..],
        _ => "",
    }
}

fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) => &name[..i],
        None => name,
    }
}

fn directory_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(0) if path.len() > 1 => "/",
        Some(0) => "",
        Some(i) => &path[..i],
        None => "",
    }
}
