//! [`Value`] → wire bytes.
//!
//! Output carries no whitespace between tags, so for a given value the
//! bytes are always the same.

use bytes::{BufMut, BytesMut};
use chrono::Datelike;
use xrpc_value::{Fault, Value, ValueError};

use crate::error::Result;
use crate::escape::escape;
use crate::scalar::{encode_base64, format_timestamp};
use crate::tags::{
    ARRAY, BASE64, BOOLEAN, DATA, DATE_TIME, DOUBLE, FAULT_CODE, FAULT_STRING, INT, MEMBER,
    NAME, STRING, STRUCT, VALUE,
};

/// Append the encoding of `value` to `dst`.
///
/// With `typed` unset, booleans, integers, doubles and strings are written as
/// bare text. Container members are always typed. On error `dst` is left
/// exactly as it was.
pub fn encode_value(value: &Value, typed: bool, dst: &mut BytesMut) -> Result<()> {
    let mark = dst.len();
    let result = write_value(value, typed, dst);
    if result.is_err() {
        dst.truncate(mark);
    }
    result
}

/// Encode a single value into a fresh string.
pub fn value_to_xml(value: &Value) -> Result<String> {
    let mut buf = BytesMut::new();
    encode_value(value, true, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(crate) fn write_value(value: &Value, typed: bool, dst: &mut BytesMut) -> Result<()> {
    match value {
        Value::Boolean(flag) => write_scalar(dst, BOOLEAN, if *flag { "1" } else { "0" }, typed),
        Value::Integer(n) => write_scalar(dst, INT, &n.to_string(), typed),
        Value::Double(x) => {
            if !x.is_finite() {
                return Err(ValueError::Unsupported(format!("non-finite double {x}")).into());
            }
            write_scalar(dst, DOUBLE, &x.to_string(), typed);
        }
        Value::Text(text) => write_scalar(dst, STRING, &escape(text), typed),
        Value::Timestamp(stamp) => {
            if !(0..=9999).contains(&stamp.year()) {
                return Err(ValueError::Unsupported(format!("timestamp year {}", stamp.year())).into());
            }
            write_scalar(dst, DATE_TIME, &format_timestamp(stamp), true);
        }
        Value::Binary(bytes) => write_scalar(dst, BASE64, &encode_base64(bytes), true),
        Value::List(items) => {
            open(dst, ARRAY);
            open(dst, DATA);
            for item in items {
                open(dst, VALUE);
                write_value(item, true, dst)?;
                close(dst, VALUE);
            }
            close(dst, DATA);
            close(dst, ARRAY);
        }
        Value::Record(record) => {
            open(dst, STRUCT);
            for (name, member) in record {
                write_member(dst, name, |dst| write_value(member, true, dst))?;
            }
            close(dst, STRUCT);
        }
        Value::Fault(fault) => write_fault_struct(fault, dst),
    }
    Ok(())
}

/// `<struct>` with the `faultCode`/`faultString` members.
pub(crate) fn write_fault_struct(fault: &Fault, dst: &mut BytesMut) {
    open(dst, STRUCT);
    open(dst, MEMBER);
    leaf(dst, NAME, FAULT_CODE);
    open(dst, VALUE);
    leaf(dst, INT, &fault.code.to_string());
    close(dst, VALUE);
    close(dst, MEMBER);
    open(dst, MEMBER);
    leaf(dst, NAME, FAULT_STRING);
    open(dst, VALUE);
    leaf(dst, STRING, &escape(&fault.message));
    close(dst, VALUE);
    close(dst, MEMBER);
    close(dst, STRUCT);
}

fn write_member<F>(dst: &mut BytesMut, name: &str, body: F) -> Result<()>
where
    F: FnOnce(&mut BytesMut) -> Result<()>,
{
    open(dst, MEMBER);
    leaf(dst, NAME, &escape(name));
    open(dst, VALUE);
    body(dst)?;
    close(dst, VALUE);
    close(dst, MEMBER);
    Ok(())
}

fn write_scalar(dst: &mut BytesMut, tag: &str, body: &str, typed: bool) {
    if typed {
        leaf(dst, tag, body);
    } else {
        dst.put_slice(body.as_bytes());
    }
}

pub(crate) fn leaf(dst: &mut BytesMut, tag: &str, body: &str) {
    open(dst, tag);
    dst.put_slice(body.as_bytes());
    close(dst, tag);
}

pub(crate) fn open(dst: &mut BytesMut, tag: &str) {
    dst.reserve(tag.len() + 2);
    dst.put_u8(b'<');
    dst.put_slice(tag.as_bytes());
    dst.put_u8(b'>');
}

pub(crate) fn close(dst: &mut BytesMut, tag: &str) {
    dst.reserve(tag.len() + 3);
    dst.put_slice(b"</");
    dst.put_slice(tag.as_bytes());
    dst.put_u8(b'>');
}
