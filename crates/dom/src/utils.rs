//! Utility functions: name validation and markup escaping

use crate::error::{DomError, Result};

/// Cap text length to keep serialized output readable
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Element names: ASCII letter first, then letters, digits, `-`, `_`, `.` or `:`
pub fn validate_tag_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidName(name.to_string()))
    }
}

/// Attribute names: non-empty, no whitespace, quotes, `=`, `<`, `>` or `/`
pub fn validate_attribute_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '/')
        });

    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidName(name.to_string()))
    }
}

/// Escape character data for text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keep comment data from terminating the comment early
pub fn escape_comment(value: &str) -> String {
    value.replace("-->", "--&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("héllo", 2), "hé...");
    }

    #[test]
    fn test_tag_names() {
        assert!(validate_tag_name("ul").is_ok());
        assert!(validate_tag_name("my-widget").is_ok());
        assert!(validate_tag_name("svg:rect").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("1div").is_err());
        assert!(validate_tag_name("di v").is_err());
        assert!(validate_tag_name("<p>").is_err());
    }

    #[test]
    fn test_attribute_names() {
        assert!(validate_attribute_name("data-id").is_ok());
        assert!(validate_attribute_name("aria-label").is_ok());
        assert!(validate_attribute_name("").is_err());
        assert!(validate_attribute_name("a b").is_err());
        assert!(validate_attribute_name("a=b").is_err());
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_comment("a-->b"), "a--&gt;b");
    }
}
