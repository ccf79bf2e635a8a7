//! Android string resource escaping.
//!
//! Values are stored XML-escaped and Android-escaped. `escape_value` produces
//! the element text for a plain string; `decode_value` reverses the Android
//! escapes of text that has already been XML-unescaped.

/// Escape a plain string for use as `<string>` element text.
///
/// Text whose whitespace would be collapsed is wrapped in double quotes.
pub fn escape_value(text: &str) -> String {
    let escaped = escape_chars(text);
    let needs_quotes = text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ");
    if needs_quotes {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

fn escape_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '@' | '?' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Resolve Android escapes and quoting in XML-unescaped element text.
///
/// Unquoted runs of whitespace collapse to one space, as aapt does.
pub fn decode_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quoted = false;
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                flush_space(&mut out, &mut pending_space);
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let hex: String = chars.by_ref().take(4).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) => out.push(decoded),
                            None => {
                                out.push_str("\\u");
                                out.push_str(&hex);
                            }
                        }
                    }
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            }
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => pending_space = true,
            _ => {
                flush_space(&mut out, &mut pending_space);
                out.push(c);
            }
        }
    }
    if pending_space && !out.is_empty() {
        out.push(' ');
    }
    out
}

fn flush_space(out: &mut String, pending_space: &mut bool) {
    if *pending_space && !out.is_empty() {
        out.push(' ');
    }
    *pending_space = false;
}
