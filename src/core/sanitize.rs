// src/core/sanitize.rs

/// Collapse runs of whitespace to one space and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Escape text for interpolation into an HTML mail body.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Turn a logical state key (`zigzag:wannamine`) into a file stem.
/// ASCII alphanumerics and `-` pass through; every other byte (`_` included)
/// becomes `_XX` in upper-case hex, so distinct keys never share a file.
/// The empty key is `_`.
pub fn sanitize_key_filename(key: &str) -> String {
    if key.is_empty() { return "_".to_string(); }
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' { out.push(char::from(b)); }
        else { out.push_str(&format!("_{b:02X}")); }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_collapses() {
        assert_eq!(normalize_ws("  10,000\n 원 "), "10,000 원");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn key_to_filename() {
        assert_eq!(sanitize_key_filename("zigzag:wannamine"), "zigzag_3Awannamine");
        assert_eq!(sanitize_key_filename("zigzag/wannamine"), "zigzag_2Fwannamine");
        assert_eq!(sanitize_key_filename("zigzag_wannamine"), "zigzag_5Fwannamine");
        assert_eq!(sanitize_key_filename("a/../b"), "a_2F_2E_2E_2Fb");
        assert_eq!(sanitize_key_filename(""), "_");
    }
}
