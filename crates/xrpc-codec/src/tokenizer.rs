//! Adapter between the XML tokenizer and the decoder.
//!
//! The decoder only sees three kinds of [`Event`]: element starts, element
//! ends and character data. Everything else in the document (declarations,
//! comments, processing instructions, doctype) is dropped here.

use std::collections::VecDeque;
use std::io::BufRead;

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

use crate::error::{CodecError, Result};

/// A tokenizer event, owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `<name>` (local name, prefix stripped).
    Start(String),
    /// `</name>`.
    End(String),
    /// Unescaped character data, CDATA included.
    Text(String),
}

impl Event {
    /// Render the event the way it appears in error messages.
    pub fn describe(&self) -> String {
        match self {
            Event::Start(name) => format!("<{name}>"),
            Event::End(name) => format!("</{name}>"),
            Event::Text(text) => format!("text {text:?}"),
        }
    }
}

/// Anything that yields tokenizer events.
///
/// `Ok(None)` marks the end of the stream.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<Event>>;
}

/// A scripted event sequence.
impl EventSource for VecDeque<Event> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.pop_front())
    }
}

/// [`EventSource`] over a `quick_xml` reader.
pub struct XmlTokenizer<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> XmlTokenizer<R> {
    /// Wrap a buffered byte stream.
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Self {
            reader,
            buf: Vec::with_capacity(1024),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    /// Consume the tokenizer and return the inner stream.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: BufRead> EventSource for XmlTokenizer<R> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(err) => return Err(tokenizer_error(err, self.reader.buffer_position() as u64)),
            };
            let position = self.reader.buffer_position() as u64;
            let mapped = match event {
                XmlEvent::Start(start) => {
                    Event::Start(utf8_name(start.local_name().as_ref(), position)?)
                }
                XmlEvent::End(end) => Event::End(utf8_name(end.local_name().as_ref(), position)?),
                XmlEvent::Text(text) => match text.unescape() {
                    Ok(unescaped) => Event::Text(unescaped.into_owned()),
                    Err(err) => return Err(tokenizer_error(err, position)),
                },
                XmlEvent::CData(cdata) => match String::from_utf8(cdata.into_inner().into_owned()) {
                    Ok(text) => Event::Text(text),
                    Err(err) => {
                        return Err(CodecError::Tokenizer {
                            position,
                            message: format!("CDATA is not valid UTF-8: {err}"),
                        })
                    }
                },
                XmlEvent::Eof => return Ok(None),
                _ => continue,
            };
            return Ok(Some(mapped));
        }
    }
}

fn utf8_name(raw: &[u8], position: u64) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|err| CodecError::Tokenizer {
            position,
            message: format!("element name is not valid UTF-8: {err}"),
        })
}

fn tokenizer_error(err: quick_xml::Error, position: u64) -> CodecError {
    match err {
        quick_xml::Error::Io(io) => {
            CodecError::Io(std::io::Error::new(io.kind(), io.to_string()))
        }
        other => CodecError::Tokenizer {
            position,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(xml: &str) -> Vec<Event> {
        let mut tokenizer = XmlTokenizer::new(xml.as_bytes());
        let mut out = Vec::new();
        while let Some(event) = tokenizer.next_event().unwrap() {
            out.push(event);
        }
        out
    }

    #[test]
    fn yields_start_text_end() {
        assert_eq!(
            events("<a>hi</a>"),
            vec![
                Event::Start("a".into()),
                Event::Text("hi".into()),
                Event::End("a".into()),
            ]
        );
    }

    #[test]
    fn drops_declaration_and_comments() {
        assert_eq!(
            events("<?xml version=\"1.0\"?><!-- note --><a/>"),
            vec![Event::Start("a".into()), Event::End("a".into())]
        );
    }

    #[test]
    fn unescapes_text_and_keeps_cdata_raw() {
        assert_eq!(
            events("<s>a &amp; b<![CDATA[<raw>&amp;]]></s>"),
            vec![
                Event::Start("s".into()),
                Event::Text("a & b".into()),
                Event::Text("<raw>&amp;".into()),
                Event::End("s".into()),
            ]
        );
    }

    #[test]
    fn strips_namespace_prefixes() {
        assert_eq!(
            events("<ex:i8 xmlns:ex=\"http://ws.apache.org/xmlrpc/namespaces/extensions\">1</ex:i8>"),
            vec![
                Event::Start("i8".into()),
                Event::Text("1".into()),
                Event::End("i8".into()),
            ]
        );
    }

    #[test]
    fn mismatched_end_tag_is_a_tokenizer_error() {
        let mut tokenizer = XmlTokenizer::new("<a></b>".as_bytes());
        assert_eq!(tokenizer.next_event().unwrap(), Some(Event::Start("a".into())));
        let err = tokenizer.next_event().unwrap_err();
        assert!(matches!(err, CodecError::Tokenizer { .. }), "{err:?}");
    }

    #[test]
    fn bad_entity_reports_its_stream_position() {
        let mut tokenizer = XmlTokenizer::new("<a>x &bogus; y</a>".as_bytes());
        assert_eq!(tokenizer.next_event().unwrap(), Some(Event::Start("a".into())));
        let err = tokenizer.next_event().unwrap_err();
        assert!(
            matches!(err, CodecError::Tokenizer { position, .. } if position > 3),
            "{err:?}"
        );
    }

    #[test]
    fn scripted_source_drains_in_order() {
        let mut source: VecDeque<Event> =
            [Event::Start("x".into()), Event::End("x".into())].into();
        assert_eq!(source.next_event().unwrap(), Some(Event::Start("x".into())));
        assert_eq!(source.next_event().unwrap(), Some(Event::End("x".into())));
        assert_eq!(source.next_event().unwrap(), None);
    }
}
