//! Markdown front end.
//!
//! The converter core consumes HTML, not markdown: the renderer here is
//! an upstream collaborator whose only contract is the restricted tag
//! vocabulary (`h1 h2 p li pre code strong b em i ol ul blockquote` plus
//! text). Extensions stay disabled so the emitted vocabulary does not
//! grow behind the converter's back; anything else that sneaks through
//! passes the HTML output inertly and contributes no man-page semantics.

use pulldown_cmark::{Options, Parser, html};

/// Render markdown text to the restricted HTML vocabulary.
///
/// # Examples
///
/// ```
/// use manweave::render_markdown;
///
/// let html = render_markdown("# NAME\n");
/// assert_eq!(html.trim(), "<h1>NAME</h1>");
/// ```
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::empty());
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_blocks() {
        let out = render_markdown("# Title\n\nBody text.\n");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("<p>Body text.</p>"));
    }

    #[test]
    fn test_render_lists_carry_start() {
        let out = render_markdown("3. three\n4. four\n");
        assert!(out.contains("<ol start=\"3\">"));
        // A zero-started list is how markdown spells a description list.
        let out = render_markdown("0. term\n");
        assert!(out.contains("<ol start=\"0\">"));
    }

    #[test]
    fn test_render_inline_code_and_emphasis() {
        let out = render_markdown("use `ls -l` and *emphasis* and **bold**\n");
        assert!(out.contains("<code>ls -l</code>"));
        assert!(out.contains("<em>emphasis</em>"));
        assert!(out.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_code_block_escapes_entities() {
        let out = render_markdown("    x < y\n");
        assert!(out.contains("<pre><code>x &lt; y\n</code></pre>"));
    }
}
