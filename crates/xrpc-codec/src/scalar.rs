//! Scalar bodies: text ↔ [`Value`] for the leaf tags.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Offset, TimeZone, Utc};
use xrpc_value::{Kind, Timestamp, Value};

use crate::error::{CodecError, Result};

/// Dense local form, e.g. `19980717T14:08:55`.
pub const DENSE_LOCAL_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Local form with separators, e.g. `1998-07-17T14:08:55`.
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Offset-bearing form, e.g. `1998-07-17T14:08:55+02:00`. Used on encode.
pub const FULL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Dense form with a compact offset, e.g. `19980717T14:08:55-0700`.
pub const DENSE_OFFSET_FORMAT: &str = "%Y%m%dT%H:%M:%S%z";

/// Parse the body of a scalar element declared as `tag`.
pub fn parse_scalar(kind: Kind, tag: &str, body: String) -> Result<Value> {
    match kind {
        Kind::Text => Ok(Value::Text(body)),
        Kind::Boolean => parse_boolean(&body)
            .map(Value::Boolean)
            .ok_or_else(|| CodecError::scalar(tag, &body, "expected 1, 0, true or false")),
        Kind::Integer => body
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|err| CodecError::scalar(tag, &body, err)),
        Kind::Double => body
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|err| CodecError::scalar(tag, &body, err)),
        Kind::Timestamp => parse_timestamp(&body)
            .map(Value::Timestamp)
            .ok_or_else(|| CodecError::scalar(tag, &body, "no known timestamp format matches")),
        Kind::Binary => decode_base64(&body)
            .map(Value::Binary)
            .map_err(|err| CodecError::scalar(tag, &body, err)),
        Kind::List | Kind::Record | Kind::Fault => {
            Err(CodecError::scalar(tag, &body, "not a scalar type"))
        }
    }
}

/// Accepts the usual spellings of true and false, trimmed.
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Try each timestamp form in priority order.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    for format in [DENSE_LOCAL_FORMAT, LOCAL_FORMAT] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.fix().from_utc_datetime(&naive));
        }
    }
    for format in [FULL_FORMAT, DENSE_OFFSET_FORMAT] {
        if let Ok(stamp) = DateTime::parse_from_str(text, format) {
            return Some(stamp);
        }
    }
    DateTime::parse_from_rfc3339(text).ok()
}

/// Format a timestamp in the offset-bearing form.
pub fn format_timestamp(stamp: &Timestamp) -> String {
    stamp.format(FULL_FORMAT).to_string()
}

/// Decode standard base64, ignoring line breaks and other ASCII whitespace.
pub fn decode_base64(text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Timelike};

    #[test]
    fn boolean_spellings() {
        for text in ["1", "true", " True\n", "T"] {
            assert_eq!(parse_boolean(text), Some(true), "{text:?}");
        }
        for text in ["0", "false", "FALSE", "f"] {
            assert_eq!(parse_boolean(text), Some(false), "{text:?}");
        }
        assert_eq!(parse_boolean("yes"), None);
        assert_eq!(parse_boolean("2"), None);
    }

    #[test]
    fn integers_trim_and_reject_garbage() {
        assert_eq!(
            parse_scalar(Kind::Integer, "i4", " 41\n".into()).unwrap(),
            Value::Integer(41)
        );
        assert_eq!(
            parse_scalar(Kind::Integer, "i8", "-9223372036854775808".into()).unwrap(),
            Value::Integer(i64::MIN)
        );
        let err = parse_scalar(Kind::Integer, "int", "4x".into()).unwrap_err();
        assert!(matches!(err, CodecError::ScalarFormat { ref tag, .. } if tag == "int"));
    }

    #[test]
    fn doubles_parse_decimal_text() {
        assert_eq!(
            parse_scalar(Kind::Double, "double", "-0.333333".into()).unwrap(),
            Value::Double(-0.333333)
        );
        assert!(parse_scalar(Kind::Double, "double", "one".into()).is_err());
    }

    #[test]
    fn string_body_is_untouched() {
        assert_eq!(
            parse_scalar(Kind::Text, "string", "  padded  ".into()).unwrap(),
            Value::from("  padded  ")
        );
    }

    #[test]
    fn dense_local_timestamp_is_utc() {
        let stamp = parse_timestamp("19980717T14:08:55").unwrap();
        assert_eq!((stamp.year(), stamp.month(), stamp.day()), (1998, 7, 17));
        assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (14, 8, 55));
        assert_eq!(stamp.offset().local_minus_utc(), 0);
    }

    #[test]
    fn every_timestamp_form_parses() {
        let local = parse_timestamp("1998-07-17T14:08:55").unwrap();
        let full = parse_timestamp("1998-07-17T16:08:55+02:00").unwrap();
        let dense = parse_timestamp("19980717T07:08:55-0700").unwrap();
        let zulu = parse_timestamp("1998-07-17T14:08:55Z").unwrap();
        assert_eq!(local, full);
        assert_eq!(local, dense);
        assert_eq!(local, zulu);
        assert_eq!(full.offset(), &FixedOffset::east_opt(7200).unwrap());
    }

    #[test]
    fn bad_timestamp_is_a_scalar_error() {
        let err = parse_scalar(Kind::Timestamp, "dateTime.iso8601", "yesterday".into()).unwrap_err();
        assert!(matches!(err, CodecError::ScalarFormat { .. }));
    }

    #[test]
    fn timestamp_formats_with_offset() {
        let stamp = parse_timestamp("19980717T14:08:55").unwrap();
        assert_eq!(format_timestamp(&stamp), "1998-07-17T14:08:55+00:00");
    }

    #[test]
    fn base64_ignores_line_breaks() {
        assert_eq!(
            decode_base64("eW91IGNhbid0IHJl\nYWQgdGhpcyE=").unwrap(),
            b"you can't read this!"
        );
        assert_eq!(encode_base64(b"you can't read this!"), "eW91IGNhbid0IHJlYWQgdGhpcyE=");
        assert!(decode_base64("not base64!").is_err());
    }

    #[test]
    fn containers_are_not_scalars() {
        assert!(parse_scalar(Kind::List, "array", String::new()).is_err());
    }
}
