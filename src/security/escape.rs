//! HTML escaping module
//!
//! Escapes user-supplied text before it is echoed into an HTML-rendering
//! context. JSON responses do not strictly need it, but every handler that
//! echoes user text routes it through here anyway.

/// Escape the five HTML-significant characters: `&`, `<`, `>`, `"`, `'`
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_special_chars() {
        assert_eq!(
            escape_html(r#"<a href="x" onclick='y'>&"#),
            "&lt;a href=&quot;x&quot; onclick=&#039;y&#039;&gt;&amp;"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_html("Alice Dupont, 42 ans"), "Alice Dupont, 42 ans");
    }

    #[test]
    fn test_script_tag_neutralized() {
        let escaped = escape_html("<script>alert(1)</script>");
        assert!(!escaped.contains("<script>"));
        assert!(escaped.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_ampersand_first() {
        // `&` must not be double-escaped through later replacements
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }
}
