//! `System.Net.Primitives`: URL and HTML encoding helpers.

use quickc_core::{CallContext, DataType, NativeError};

use crate::Library;

pub const LIBRARY_NAME: &str = "System.Net.Primitives";

pub fn library() -> Library {
    use DataType::String;

    let mut lib = Library::new(LIBRARY_NAME);
    lib.class("System.Net", "WebUtility")
        .function("UrlEncode", &[String], String, map(url_encode))
        .function("UrlDecode", &[String], String, map(url_decode))
        .function("HtmlEncode", &[String], String, map(html_encode))
        .function("HtmlDecode", &[String], String, map(html_decode));
    lib
}

fn map(
    f: fn(&str) -> String,
) -> impl Fn(&mut CallContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static {
    move |ctx| {
        let result = f(ctx.arg_str(0)?);
        ctx.set_return(result);
        Ok(())
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'!' | b'*' | b'(' | b')')
}

fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b' ' => out.push('+'),
            b if is_unreserved(b) => out.push(b as char),
            b => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Malformed escapes pass through unchanged.
fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

fn html_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn html_decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match rest.find(';').and_then(|end| entity(&rest[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encode_escapes_reserved_bytes() {
        assert_eq!(url_encode("a b&c=d"), "a+b%26c%3Dd");
        assert_eq!(url_encode("safe-_.!*()"), "safe-_.!*()");
        assert_eq!(url_encode("é"), "%C3%A9");
    }

    #[test]
    fn url_decode_reverses_encoding() {
        assert_eq!(url_decode("a+b%26c%3Dd"), "a b&c=d");
        assert_eq!(url_decode("%C3%A9"), "é");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn html_round_trip() {
        let raw = "<a href=\"x\">Tom & 'Jerry'</a>";
        let encoded = html_encode(raw);
        assert_eq!(encoded, "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
        assert_eq!(html_decode(&encoded), raw);
    }

    #[test]
    fn html_decode_leaves_unknown_entities() {
        assert_eq!(html_decode("&bogus; &#65; & done"), "&bogus; A & done");
    }

    #[test]
    fn library_exposes_web_utility() {
        let lib = library();
        assert!(lib.provides_namespace("System.Net"));
        let class = lib.find_class("System.Net.WebUtility").unwrap();
        assert_eq!(class.functions().len(), 4);
    }
}
