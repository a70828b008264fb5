//! Text escaping for element bodies.
//!
//! Exactly five characters are escaped on output: `< > & " '`.

use std::borrow::Cow;

use crate::error::Result;

fn replacement(byte: u8) -> Option<&'static str> {
    match byte {
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'&' => Some("&amp;"),
        b'"' => Some("&quot;"),
        b'\'' => Some("&apos;"),
        _ => None,
    }
}

/// Escape text for use as an element body.
///
/// Borrows the input when nothing needs escaping.
pub fn escape(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = bytes.iter().position(|b| replacement(*b).is_some()) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..first]);
    let mut start = first;
    for (i, byte) in bytes.iter().enumerate().skip(first) {
        if let Some(rep) = replacement(*byte) {
            out.push_str(&text[start..i]);
            out.push_str(rep);
            start = i + 1;
        }
    }
    out.push_str(&text[start..]);
    Cow::Owned(out)
}

/// Resolve the predefined entities and character references in `text`.
pub fn unescape(text: &str) -> Result<Cow<'_, str>> {
    Ok(quick_xml::escape::unescape(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn escapes_the_five_special_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape("árvíztűrő tükörfúrógép"), Cow::Borrowed(_)));
    }

    #[test]
    fn nothing_else_is_escaped() {
        assert_eq!(escape("tab\tnewline\n\u{7f}é"), "tab\tnewline\n\u{7f}é");
    }

    #[test]
    fn already_escaped_text_is_escaped_again() {
        assert_eq!(escape("&amp;"), "&amp;amp;");
        assert_eq!(unescape(&escape("&amp;")).unwrap(), "&amp;");
    }

    #[test]
    fn unescape_resolves_character_references() {
        assert_eq!(unescape("&#65;&#x42;&lt;").unwrap(), "AB<");
    }

    #[test]
    fn unescape_rejects_unknown_entities() {
        let err = unescape("&bogus;").unwrap_err();
        assert!(matches!(err, CodecError::Entity(_)), "{err:?}");
    }
}
