//! Escaping for Telegram's legacy Markdown dialect.

/// Characters that flip formatting state in Telegram Markdown.
const SPECIAL: &[char] = &['_', '*', '[', ']', '(', ')'];

/// Escape markup-significant characters outside of code. The text is
/// split on ``` boundaries and the in-fence state toggles at each one,
/// so fenced content passes through untouched and an unclosed fence
/// leaves the remainder of the text unescaped. Within prose segments,
/// single-backtick inline spans are skipped the same way.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, segment) in text.split("```").enumerate() {
        if i > 0 {
            out.push_str("```");
        }
        if i % 2 == 1 {
            out.push_str(segment);
        } else {
            escape_prose(segment, &mut out);
        }
    }
    out
}

fn escape_prose(segment: &str, out: &mut String) {
    for (i, span) in segment.split('`').enumerate() {
        if i > 0 {
            out.push('`');
        }
        if i % 2 == 1 {
            out.push_str(span);
        } else {
            for ch in span.chars() {
                if SPECIAL.contains(&ch) {
                    out.push('\\');
                }
                out.push(ch);
            }
        }
    }
}
