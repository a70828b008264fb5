//! Method call and response envelopes.
//!
//! ```text
//! <methodCall><methodName>NAME</methodName><params><param><value>…</value></param>…</params></methodCall>
//! <methodResponse><params>…</params></methodResponse>
//! <methodResponse><fault><value><struct>faultCode, faultString</struct></value></fault></methodResponse>
//! ```

use bytes::{BufMut, BytesMut};
use xrpc_value::{Fault, Value};

use crate::config::{CodecConfig, XML_DECLARATION};
use crate::decoder::{Decoder, Parsed};
use crate::encoder::{close, leaf, open, write_fault_struct, write_value};
use crate::error::{CodecError, Result};
use crate::escape::escape;
use crate::tags::{
    FAULT, FAULT_CODE, FAULT_STRING, METHOD_CALL, METHOD_NAME, METHOD_RESPONSE, PARAM, PARAMS,
    VALUE,
};
use crate::tokenizer::{Event, EventSource, XmlTokenizer};

/// One complete message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A request naming a method.
    Call { name: String, params: Vec<Value> },
    /// A successful response.
    Response { params: Vec<Value> },
    /// A failed response.
    Fault(Fault),
}

impl Envelope {
    pub fn call(name: impl Into<String>, params: Vec<Value>) -> Self {
        Envelope::Call {
            name: name.into(),
            params,
        }
    }

    pub fn response(params: Vec<Value>) -> Self {
        Envelope::Response { params }
    }

    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Envelope::Fault(Fault::new(code, message))
    }

    /// Short label for logs: `call`, `response` or `fault`.
    pub fn label(&self) -> &'static str {
        match self {
            Envelope::Call { .. } => "call",
            Envelope::Response { .. } => "response",
            Envelope::Fault(_) => "fault",
        }
    }

    /// The method name of a call.
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Envelope::Call { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Parameters of a call or response; empty for a fault.
    pub fn params(&self) -> &[Value] {
        match self {
            Envelope::Call { params, .. } | Envelope::Response { params } => params,
            Envelope::Fault(_) => &[],
        }
    }

    /// Encode with the default configuration.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = BytesMut::new();
        encode_envelope(self, &mut buf, &CodecConfig::default())?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Append the encoding of `envelope` to `dst`. On error `dst` is unchanged.
pub fn encode_envelope(envelope: &Envelope, dst: &mut BytesMut, config: &CodecConfig) -> Result<()> {
    match envelope {
        Envelope::Call { name, params } => encode_call(name, params, dst, config),
        Envelope::Response { params } => encode_response(params, dst, config),
        Envelope::Fault(fault) => {
            encode_fault(fault, dst, config);
            Ok(())
        }
    }
}

/// Append a `methodCall` envelope.
pub fn encode_call(
    name: &str,
    params: &[Value],
    dst: &mut BytesMut,
    config: &CodecConfig,
) -> Result<()> {
    if name.is_empty() {
        return Err(CodecError::EmptyMethodName);
    }
    let mark = dst.len();
    declaration(dst, config);
    open(dst, METHOD_CALL);
    leaf(dst, METHOD_NAME, &escape(name));
    if let Err(err) = write_params(params, dst) {
        dst.truncate(mark);
        return Err(err);
    }
    close(dst, METHOD_CALL);
    Ok(())
}

/// Append a `methodResponse` envelope.
///
/// A [`Value::Fault`] in first position turns the whole response into a
/// fault response.
pub fn encode_response(params: &[Value], dst: &mut BytesMut, config: &CodecConfig) -> Result<()> {
    if let Some(Value::Fault(fault)) = params.first() {
        encode_fault(fault, dst, config);
        return Ok(());
    }
    let mark = dst.len();
    declaration(dst, config);
    open(dst, METHOD_RESPONSE);
    if let Err(err) = write_params(params, dst) {
        dst.truncate(mark);
        return Err(err);
    }
    close(dst, METHOD_RESPONSE);
    Ok(())
}

/// Append a fault response. Cannot fail.
pub fn encode_fault(fault: &Fault, dst: &mut BytesMut, config: &CodecConfig) {
    declaration(dst, config);
    open(dst, METHOD_RESPONSE);
    open(dst, FAULT);
    open(dst, VALUE);
    write_fault_struct(fault, dst);
    close(dst, VALUE);
    close(dst, FAULT);
    close(dst, METHOD_RESPONSE);
}

fn declaration(dst: &mut BytesMut, config: &CodecConfig) {
    if config.xml_declaration {
        dst.put_slice(XML_DECLARATION.as_bytes());
    }
}

fn write_params(params: &[Value], dst: &mut BytesMut) -> Result<()> {
    open(dst, PARAMS);
    for param in params {
        open(dst, PARAM);
        open(dst, VALUE);
        write_value(param, true, dst)?;
        close(dst, VALUE);
        close(dst, PARAM);
    }
    close(dst, PARAMS);
    Ok(())
}

/// Decode one envelope from a complete document.
pub fn decode_envelope(xml: &[u8]) -> Result<Envelope> {
    decode_envelope_with_config(xml, &CodecConfig::default())
}

pub fn decode_envelope_with_config(xml: &[u8], config: &CodecConfig) -> Result<Envelope> {
    let mut decoder = Decoder::with_max_depth(XmlTokenizer::new(xml), config.max_depth);
    read_envelope(&mut decoder)
}

/// Decode the next envelope from a decoder positioned between messages.
///
/// End of stream before the first tag is [`CodecError::ConnectionClosed`].
pub fn read_envelope<S: EventSource>(decoder: &mut Decoder<S>) -> Result<Envelope> {
    let root = match decoder.next_significant()? {
        None => return Err(CodecError::ConnectionClosed),
        Some(Event::Start(tag)) => tag,
        Some(other) => {
            return Err(CodecError::unexpected(
                "<methodCall> or <methodResponse>",
                other.describe(),
            ))
        }
    };
    match root.as_str() {
        METHOD_CALL => read_call(decoder),
        METHOD_RESPONSE => read_response(decoder),
        _ => Err(CodecError::unexpected(
            "<methodCall> or <methodResponse>",
            format!("<{root}>"),
        )),
    }
}

fn read_call<S: EventSource>(decoder: &mut Decoder<S>) -> Result<Envelope> {
    let name = decoder.leaf(METHOD_NAME)?.trim().to_owned();
    if name.is_empty() {
        return Err(CodecError::EmptyMethodName);
    }
    let params = match decoder.sibling(PARAMS)? {
        Parsed::Item(()) => {
            let params = read_params(decoder)?;
            decoder.expect_end(METHOD_CALL)?;
            params
        }
        Parsed::Closed(close) => {
            decoder.finish(close, METHOD_CALL, 0)?;
            Vec::new()
        }
    };
    Ok(Envelope::Call { name, params })
}

fn read_response<S: EventSource>(decoder: &mut Decoder<S>) -> Result<Envelope> {
    match decoder.next_significant()? {
        Some(Event::Start(tag)) if tag == PARAMS => {
            let params = read_params(decoder)?;
            decoder.expect_end(METHOD_RESPONSE)?;
            Ok(Envelope::Response { params })
        }
        Some(Event::Start(tag)) if tag == FAULT => {
            let fault = read_fault(decoder)?;
            decoder.expect_end(FAULT)?;
            decoder.expect_end(METHOD_RESPONSE)?;
            Ok(Envelope::Fault(fault))
        }
        Some(other) => Err(CodecError::unexpected("<params> or <fault>", other.describe())),
        None => Err(CodecError::PrematureEnd("<params> or <fault>".into())),
    }
}

/// Params through `</params>`. The start tag is already consumed.
fn read_params<S: EventSource>(decoder: &mut Decoder<S>) -> Result<Vec<Value>> {
    let mut params = Vec::new();
    loop {
        match decoder.sibling(PARAM)? {
            Parsed::Item(()) => match decoder.parse_value()? {
                Parsed::Item(value) => {
                    params.push(value);
                    decoder.expect_end(PARAM)?;
                }
                Parsed::Closed(close) => {
                    return Err(CodecError::unexpected("a value", format!("</{}>", close.tag)))
                }
            },
            Parsed::Closed(close) => {
                decoder.finish(close, PARAMS, 0)?;
                return Ok(params);
            }
        }
    }
}

fn read_fault<S: EventSource>(decoder: &mut Decoder<S>) -> Result<Fault> {
    let value = match decoder.parse_value()? {
        Parsed::Item(value) => value,
        Parsed::Closed(_) => return Err(CodecError::MalformedFault("fault has no value".into())),
    };
    let record = match value {
        Value::Record(record) => record,
        other => {
            return Err(CodecError::MalformedFault(format!(
                "fault value is {}, not a struct",
                other.type_name()
            )))
        }
    };
    let code = match record.get(FAULT_CODE) {
        Some(Value::Integer(code)) => *code,
        Some(other) => {
            return Err(CodecError::MalformedFault(format!(
                "{FAULT_CODE} is {}, not an integer",
                other.type_name()
            )))
        }
        None => return Err(CodecError::MalformedFault(format!("missing {FAULT_CODE}"))),
    };
    let message = match record.get(FAULT_STRING) {
        Some(Value::Text(message)) => message.clone(),
        Some(other) => {
            return Err(CodecError::MalformedFault(format!(
                "{FAULT_STRING} is {}, not a string",
                other.type_name()
            )))
        }
        None => return Err(CodecError::MalformedFault(format!("missing {FAULT_STRING}"))),
    };
    Ok(Fault::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAULT_XML: &str = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><int>4</int></value></member>\
        <member><name>faultString</name><value><string>Too many parameters.</string></value></member>\
        </struct></value></fault></methodResponse>";

    #[test]
    fn call_encodes_byte_exact() {
        let xml = Envelope::call("add", vec![Value::Integer(1), Value::Integer(2)])
            .to_xml()
            .unwrap();
        assert_eq!(
            xml,
            "<methodCall><methodName>add</methodName><params>\
             <param><value><int>1</int></value></param>\
             <param><value><int>2</int></value></param>\
             </params></methodCall>"
        );
    }

    #[test]
    fn fault_encodes_byte_exact() {
        assert_eq!(Envelope::fault(4, "Too many parameters.").to_xml().unwrap(), FAULT_XML);
    }

    #[test]
    fn fault_in_first_response_param_becomes_fault_response() {
        let response = Envelope::response(vec![
            Value::Fault(Fault::new(4, "Too many parameters.")),
            Value::Integer(9),
        ]);
        assert_eq!(response.to_xml().unwrap(), FAULT_XML);
    }

    #[test]
    fn empty_method_name_is_rejected_both_ways() {
        let mut buf = BytesMut::new();
        let err = encode_envelope(&Envelope::call("", vec![]), &mut buf, &CodecConfig::default())
            .unwrap_err();
        assert!(matches!(err, CodecError::EmptyMethodName));
        assert!(buf.is_empty());

        let err = decode_envelope(b"<methodCall><methodName> </methodName></methodCall>").unwrap_err();
        assert!(matches!(err, CodecError::EmptyMethodName));
    }

    #[test]
    fn declaration_prefix_is_optional() {
        let config = CodecConfig {
            xml_declaration: true,
            ..CodecConfig::default()
        };
        let mut buf = BytesMut::new();
        encode_envelope(&Envelope::response(vec![]), &mut buf, &config).unwrap();
        assert_eq!(
            &buf[..],
            b"<?xml version=\"1.0\"?><methodResponse><params></params></methodResponse>"
        );
        assert_eq!(decode_envelope(&buf).unwrap(), Envelope::response(vec![]));
    }

    #[test]
    fn decodes_fault() {
        assert_eq!(
            decode_envelope(FAULT_XML.as_bytes()).unwrap(),
            Envelope::fault(4, "Too many parameters.")
        );
    }

    #[test]
    fn call_without_params_element() {
        assert_eq!(
            decode_envelope(b"<methodCall><methodName>ping</methodName></methodCall>").unwrap(),
            Envelope::call("ping", vec![])
        );
    }

    #[test]
    fn fault_with_wrong_member_types_is_malformed() {
        let xml = "<methodResponse><fault><value><struct>\
            <member><name>faultCode</name><value><string>4</string></value></member>\
            <member><name>faultString</name><value><string>x</string></value></member>\
            </struct></value></fault></methodResponse>";
        let err = decode_envelope(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedFault(_)), "{err:?}");

        let xml = "<methodResponse><fault><value><int>4</int></value></fault></methodResponse>";
        let err = decode_envelope(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedFault(_)), "{err:?}");
    }

    #[test]
    fn empty_input_is_connection_closed() {
        assert!(matches!(decode_envelope(b"").unwrap_err(), CodecError::ConnectionClosed));
        assert!(matches!(decode_envelope(b"  \n").unwrap_err(), CodecError::ConnectionClosed));
    }

    #[test]
    fn wrong_root_is_unexpected_tag() {
        let err = decode_envelope(b"<methodCalls></methodCalls>").unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedTag { .. }), "{err:?}");
    }

    #[test]
    fn params_must_hold_param_elements() {
        let err = decode_envelope(b"<methodResponse><params><value><int>1</int></value></params></methodResponse>")
            .unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedTag { .. }), "{err:?}");
    }

    #[test]
    fn accessors() {
        let call = Envelope::call("m", vec![Value::Integer(1)]);
        assert_eq!(call.method_name(), Some("m"));
        assert_eq!(call.params(), &[Value::Integer(1)]);
        assert_eq!(call.label(), "call");
        let fault = Envelope::fault(1, "x");
        assert!(fault.params().is_empty());
        assert_eq!(fault.method_name(), None);
    }
}
