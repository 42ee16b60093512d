//! Pure escaping primitives for the two output formats.
//!
//! Both functions are total over all input text and perform no I/O. They
//! return `Cow::Borrowed` when the input needs no rewriting, which is the
//! common case for body prose.

use std::borrow::Cow;

use memchr::memchr;

/// Escape text for HTML body or attribute-value context.
///
/// Replaces `&`, `<`, `>`, and `"` with their entity forms.
///
/// # Examples
///
/// ```
/// use manweave::escape_html;
///
/// assert_eq!(escape_html("a < b"), "a &lt; b");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let Some(first) = text
        .bytes()
        .position(|b| matches!(b, b'&' | b'<' | b'>' | b'"'))
    else {
        return Cow::Borrowed(text);
    };

    let mut result = String::with_capacity(text.len() + 8);
    result.push_str(&text[..first]);
    for c in text[first..].chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape literal text for troff body context.
///
/// Backslashes become the printable escape `\e`, and any line beginning
/// with `.` or `'` is prefixed with the zero-width `\&` no-op so the
/// formatter does not read it as a control line. The check applies to
/// every line of a multi-line string, which matters for preformatted
/// blocks emitted between `.nf`/`.fi`.
///
/// # Examples
///
/// ```
/// use manweave::escape_troff;
///
/// assert_eq!(escape_troff("C:\\path"), "C:\\epath");
/// assert_eq!(escape_troff(".init"), "\\&.init");
/// ```
pub fn escape_troff(text: &str) -> Cow<'_, str> {
    let has_backslash = memchr(b'\\', text.as_bytes()).is_some();
    if !has_backslash && !any_line_needs_guard(text) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len() + 8);
    let mut at_line_start = true;
    for c in text.chars() {
        if at_line_start && (c == '.' || c == '\'') {
            result.push_str("\\&");
        }
        match c {
            '\\' => result.push_str("\\e"),
            _ => result.push(c),
        }
        at_line_start = c == '\n';
    }
    Cow::Owned(result)
}

/// Check whether any line starts with a troff control character.
fn any_line_needs_guard(text: &str) -> bool {
    text.split('\n')
        .any(|line| line.starts_with('.') || line.starts_with('\''))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_html_entities() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<p>"), "&lt;p&gt;");
        assert_eq!(escape_html(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_escape_html_borrows_clean_text() {
        assert!(matches!(escape_html("nothing to do"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_html_single_pass_is_stable() {
        // Escaping is applied exactly once; clean text is a fixed point.
        let clean = "ordinary prose, no markup";
        assert_eq!(escape_html(clean), clean);
        assert_eq!(escape_html(&escape_html(clean)), clean);
    }

    #[test]
    fn test_escape_troff_backslash() {
        assert_eq!(escape_troff("a\\b"), "a\\eb");
    }

    #[test]
    fn test_escape_troff_leading_control_characters() {
        assert_eq!(escape_troff(".SH fake"), "\\&.SH fake");
        assert_eq!(escape_troff("'quote"), "\\&'quote");
        // Mid-line dots are not control characters.
        assert_eq!(escape_troff("v1.2.3"), "v1.2.3");
    }

    #[test]
    fn test_escape_troff_guards_every_line() {
        assert_eq!(escape_troff("ok\n.not ok"), "ok\n\\&.not ok");
        assert_eq!(escape_troff("a\n'b\n.c"), "a\n\\&'b\n\\&.c");
    }

    #[test]
    fn test_escape_troff_borrows_clean_text() {
        assert!(matches!(escape_troff("plain words"), Cow::Borrowed(_)));
    }

    proptest! {
        #[test]
        fn escape_html_leaves_clean_text_unchanged(s in "[^&<>\"]*") {
            let escaped = escape_html(&s);
            prop_assert_eq!(escaped.as_ref(), s.as_str());
        }

        #[test]
        fn escape_html_output_has_no_raw_metacharacters(s in ".*") {
            let escaped = escape_html(&s).into_owned();
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }

        #[test]
        fn escape_troff_never_leaves_a_control_line(s in ".*") {
            let escaped = escape_troff(&s).into_owned();
            for line in escaped.split('\n') {
                prop_assert!(!line.starts_with('.'));
                prop_assert!(!line.starts_with('\''));
            }
        }
    }
}
