//! HTML fragment helpers.

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text for a single-quoted JavaScript string literal that itself
/// sits inside a double-quoted HTML attribute (`onclick="f('...')"`).
pub fn escape_js_arg(s: &str) -> String {
    let js = s.replace('\\', "\\\\").replace('\'', "\\'");
    js.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape("plain.png"), "plain.png");
    }

    #[test]
    fn test_escape_js_arg() {
        assert_eq!(escape_js_arg("it's.png"), "it\\'s.png");
        assert_eq!(escape_js_arg("a\"b"), "a&quot;b");
        assert_eq!(escape_js_arg("c:\\x"), "c:\\\\x");
    }
}
