//! Decoding of string literal source text.
//!
//! Kotlin literals are lexed from their raw source so that template entries
//! (`$name`, `${expr}`) come out as separate segments. Java literals (plain and
//! text blocks) decode to a single value.

/// One piece of a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Decoded static text.
    Text(String),
    /// Source text of an embedded expression.
    Expr(String),
}

/// Fold segments into normalized text with positional placeholders.
///
/// Expression segments become `%k$s` starting at `first_index`; their source
/// text is appended to `args` in order.
pub fn fold_segments(segments: &[Segment], first_index: usize, args: &mut Vec<String>) -> String {
    let mut text = String::new();
    let mut index = first_index;
    for segment in segments {
        match segment {
            Segment::Text(value) => text.push_str(value),
            Segment::Expr(expr) => {
                text.push_str(&format!("%{}$s", index));
                args.push(expr.clone());
                index += 1;
            }
        }
    }
    text
}

/// Lex a Kotlin string literal (`"..."` or `"""..."""`) into segments.
///
/// Returns `None` when `raw` is not a well-formed literal.
pub fn kotlin_segments(raw: &str) -> Option<Vec<Segment>> {
    let (body, is_raw) = if raw.len() >= 6 && raw.starts_with("\"\"\"") && raw.ends_with("\"\"\"") {
        (&raw[3..raw.len() - 3], true)
    } else if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        (&raw[1..raw.len() - 1], false)
    } else {
        return None;
    };

    let mut segments = Vec::new();
    let mut text = String::new();
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && !is_raw {
            let (decoded, consumed) = kotlin_escape(&chars[i + 1..])?;
            text.push(decoded);
            i += 1 + consumed;
            continue;
        }
        if c == '$' {
            match chars.get(i + 1) {
                Some('{') => {
                    let end = matching_brace(&chars, i + 1)?;
                    let expr: String = chars[i + 2..end].iter().collect();
                    flush_text(&mut segments, &mut text);
                    segments.push(Segment::Expr(expr.trim().to_string()));
                    i = end + 1;
                    continue;
                }
                Some(next) if next.is_alphabetic() || *next == '_' => {
                    let mut end = i + 1;
                    while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                        end += 1;
                    }
                    let expr: String = chars[i + 1..end].iter().collect();
                    flush_text(&mut segments, &mut text);
                    segments.push(Segment::Expr(expr));
                    i = end;
                    continue;
                }
                _ => {}
            }
        }
        text.push(c);
        i += 1;
    }
    flush_text(&mut segments, &mut text);
    Some(segments)
}

fn flush_text(segments: &mut Vec<Segment>, text: &mut String) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

/// Index of the `}` closing the `{` at `open`, skipping nested strings.
fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut i = open;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            match c {
                '\\' => i += 1,
                '"' => in_string = false,
                _ => {}
            }
        } else {
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Decode the escape after a backslash. Returns the char and chars consumed.
fn kotlin_escape(rest: &[char]) -> Option<(char, usize)> {
    let decoded = match rest.first()? {
        't' => '\t',
        'b' => '\u{0008}',
        'n' => '\n',
        'r' => '\r',
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        '$' => '$',
        'u' => {
            let hex: String = rest.get(1..5)?.iter().collect();
            let value = char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?;
            return Some((value, 5));
        }
        _ => return None,
    };
    Some((decoded, 1))
}

/// Decode a Java string literal or text block to its value.
pub fn java_value(raw: &str) -> Option<String> {
    if raw.len() >= 6 && raw.starts_with("\"\"\"") && raw.ends_with("\"\"\"") {
        return java_text_block(&raw[3..raw.len() - 3]);
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return java_unescape(&raw[1..raw.len() - 1]);
    }
    None
}

fn java_text_block(body: &str) -> Option<String> {
    // Content starts after the line terminator following the opening delimiter.
    let content = body.split_once('\n').map(|(_, rest)| rest)?;
    let lines: Vec<&str> = content.split('\n').collect();

    // The closing delimiter line counts toward the indentation when it is blank.
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| !line.trim().is_empty() || *i == lines.len() - 1)
        .map(|(_, line)| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    // Indentation is counted in characters, not bytes.
    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| {
            let rest = line
                .char_indices()
                .nth(indent)
                .map_or("", |(offset, _)| &line[offset..]);
            rest.trim_end()
        })
        .collect();

    java_unescape(&stripped.join("\n"))
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn java_unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\u{000C}'),
            's' => out.push(' '),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            // Line continuation inside text blocks.
            '\n' => {}
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                let max_digits = if d <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Segment {
        Segment::Text(value.to_string())
    }

    fn expr(value: &str) -> Segment {
        Segment::Expr(value.to_string())
    }

    #[test]
    fn test_kotlin_plain_literal() {
        assert_eq!(kotlin_segments(r#""Hello""#), Some(vec![text("Hello")]));
        assert_eq!(kotlin_segments(r#""""#), Some(vec![]));
    }

    #[test]
    fn test_kotlin_escapes() {
        assert_eq!(
            kotlin_segments(r#""Tab\tQuote\" \$5 \u0041""#),
            Some(vec![text("Tab\tQuote\" $5 A")])
        );
    }

    #[test]
    fn test_kotlin_simple_template() {
        assert_eq!(
            kotlin_segments(r#""66|$x""#),
            Some(vec![text("66|"), expr("x")])
        );
    }

    #[test]
    fn test_kotlin_block_template() {
        assert_eq!(
            kotlin_segments(r#""Hi ${user.name}, you have ${items.size} items""#),
            Some(vec![
                text("Hi "),
                expr("user.name"),
                text(", you have "),
                expr("items.size"),
                text(" items"),
            ])
        );
    }

    #[test]
    fn test_kotlin_template_with_nested_braces_and_strings() {
        assert_eq!(
            kotlin_segments(r#""Total: ${list.map { "${it}}" }.size}""#),
            Some(vec![text("Total: "), expr(r#"list.map { "${it}}" }.size"#)])
        );
    }

    #[test]
    fn test_kotlin_lone_dollar_is_text() {
        assert_eq!(kotlin_segments(r#""Price: $ 5""#), Some(vec![text("Price: $ 5")]));
    }

    #[test]
    fn test_kotlin_raw_string_keeps_backslashes() {
        assert_eq!(
            kotlin_segments(r#""""C:\dir $name""""#),
            Some(vec![text("C:\\dir "), expr("name")])
        );
    }

    #[test]
    fn test_kotlin_rejects_non_literal() {
        assert_eq!(kotlin_segments("name"), None);
        assert_eq!(kotlin_segments(r#""unterminated ${x""#), None);
    }

    #[test]
    fn test_fold_segments_numbers_placeholders() {
        let mut args = Vec::new();
        let folded = fold_segments(&[text("66|"), expr("x")], 1, &mut args);
        assert_eq!(folded, "66|%1$s");
        assert_eq!(args, vec!["x"]);

        let folded = fold_segments(&[expr("a"), text(" and "), expr("b")], 2, &mut args);
        assert_eq!(folded, "%2$s and %3$s");
        assert_eq!(args, vec!["x", "a", "b"]);
    }

    #[test]
    fn test_java_value() {
        assert_eq!(java_value(r#""Hello\n\"World\"""#), Some("Hello\n\"World\"".to_string()));
        assert_eq!(java_value(r#""\u00e9t\101""#), Some("étA".to_string()));
        assert_eq!(java_value("x"), None);
    }

    #[test]
    fn test_java_text_block() {
        let raw = "\"\"\"\n        Hello\n          World\n        \"\"\"";
        assert_eq!(java_value(raw), Some("Hello\n  World\n".to_string()));
    }

    #[test]
    fn test_java_text_block_multibyte_indent() {
        let raw = "\"\"\"\n\u{3000}Hello\n  World\n  \"\"\"";
        assert_eq!(java_value(raw), Some("Hello\n World\n".to_string()));
    }
}
