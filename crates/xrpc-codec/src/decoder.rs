//! Pull decoder from tokenizer events to [`Value`]s.
//!
//! The decoder owns one pushback slot. When a repetition (struct members,
//! array elements, envelope params) runs out, the closing tag that ended it
//! is reported as [`Parsed::Closed`] and left in the slot, so the caller
//! that owns that element consumes it next. A close is only accepted by
//! the repetition that opened at the same depth.

use xrpc_value::{Kind, Record, Value};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{CodecError, Result};
use crate::scalar::parse_scalar;
use crate::tags::{ARRAY, DATA, MEMBER, NAME, STRUCT, VALUE};
use crate::tokenizer::{Event, EventSource};

/// Outcome of reading one item of a repetition.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The next item.
    Item(T),
    /// No more items: a closing tag was found and pushed back.
    Closed(Close),
}

/// A closing tag observed where an item could have started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Close {
    /// Local name of the closing tag.
    pub tag: String,
    /// Container depth at which it was observed.
    pub depth: usize,
}

/// Stateful cursor over an [`EventSource`].
pub struct Decoder<S> {
    source: S,
    pending: Option<Event>,
    depth: usize,
    max_depth: usize,
}

impl<S: EventSource> Decoder<S> {
    /// Create a decoder with the default depth limit.
    pub fn new(source: S) -> Self {
        Self::with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(source: S, max_depth: usize) -> Self {
        Self {
            source,
            pending: None,
            depth: 0,
            max_depth,
        }
    }

    /// Current container depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Drop any pushed-back event and reset the depth counter.
    ///
    /// Only meaningful after an error, when the stream is already suspect.
    pub fn reset(&mut self) {
        self.pending = None;
        self.depth = 0;
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Decode the next value, or report the closing tag that ends the
    /// enclosing repetition.
    ///
    /// Accepts a `<value>` wrapper or a bare type tag.
    pub fn parse_value(&mut self) -> Result<Parsed<Value>> {
        match self.next_significant()? {
            Some(Event::Start(tag)) => self.parse_element(tag).map(Parsed::Item),
            Some(Event::End(tag)) => Ok(Parsed::Closed(self.push_close(tag))),
            Some(Event::Text(text)) => Err(CodecError::UnexpectedText(text)),
            None => Err(CodecError::PrematureEnd("a value".into())),
        }
    }

    /// Probe whether the next item of a repetition is `<name>`.
    ///
    /// On `Item` the start tag has been consumed.
    pub fn sibling(&mut self, name: &str) -> Result<Parsed<()>> {
        match self.next_significant()? {
            Some(Event::Start(found)) if found == name => Ok(Parsed::Item(())),
            Some(Event::End(tag)) => Ok(Parsed::Closed(self.push_close(tag))),
            Some(other) => Err(CodecError::unexpected(
                format!("<{name}> or a closing tag"),
                other.describe(),
            )),
            None => Err(CodecError::PrematureEnd(format!("<{name}> or a closing tag"))),
        }
    }

    /// Consume the close that ended a repetition of `tag` opened at `level`.
    pub fn finish(&mut self, close: Close, tag: &str, level: usize) -> Result<()> {
        if close.depth != level || close.tag != tag {
            return Err(CodecError::unexpected(
                format!("</{tag}>"),
                format!("</{}>", close.tag),
            ));
        }
        self.expect_end(tag)
    }

    /// Consume `<name>`, skipping whitespace.
    pub fn expect_start(&mut self, name: &str) -> Result<()> {
        match self.next_significant()? {
            Some(Event::Start(found)) if found == name => Ok(()),
            Some(other) => Err(CodecError::unexpected(format!("<{name}>"), other.describe())),
            None => Err(CodecError::PrematureEnd(format!("<{name}>"))),
        }
    }

    /// Consume `</name>`, skipping whitespace.
    pub fn expect_end(&mut self, name: &str) -> Result<()> {
        match self.next_significant()? {
            Some(Event::End(found)) if found == name => Ok(()),
            Some(other) => Err(CodecError::unexpected(format!("</{name}>"), other.describe())),
            None => Err(CodecError::PrematureEnd(format!("</{name}>"))),
        }
    }

    /// Read `<name>text</name>` and return the raw text.
    pub fn leaf(&mut self, name: &str) -> Result<String> {
        self.expect_start(name)?;
        self.read_text(name)
    }

    /// Next event that is not whitespace-only text. `None` at end of stream.
    pub fn next_significant(&mut self) -> Result<Option<Event>> {
        loop {
            match self.next_raw()? {
                Some(Event::Text(text)) if is_blank(&text) => continue,
                other => return Ok(other),
            }
        }
    }

    fn next_raw(&mut self) -> Result<Option<Event>> {
        match self.pending.take() {
            Some(event) => Ok(Some(event)),
            None => self.source.next_event(),
        }
    }

    fn push_close(&mut self, tag: String) -> Close {
        let close = Close {
            tag: tag.clone(),
            depth: self.depth,
        };
        self.pending = Some(Event::End(tag));
        close
    }

    /// Character data up to `</name>`. The start tag is already consumed.
    fn read_text(&mut self, name: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_raw()? {
                Some(Event::Text(chunk)) => text.push_str(&chunk),
                Some(Event::End(tag)) if tag == name => return Ok(text),
                Some(other) => {
                    return Err(CodecError::unexpected(
                        format!("text or </{name}>"),
                        other.describe(),
                    ))
                }
                None => return Err(CodecError::PrematureEnd(format!("</{name}>"))),
            }
        }
    }

    fn parse_element(&mut self, tag: String) -> Result<Value> {
        if tag == VALUE {
            return self.parse_wrapped();
        }
        match Kind::from_wire_tag(&tag) {
            Some(Kind::Record) => self.parse_struct(),
            Some(Kind::List) => self.parse_array(),
            Some(kind) => {
                let body = self.read_text(&tag)?;
                parse_scalar(kind, &tag, body)
            }
            None => Err(CodecError::UnknownTag(tag)),
        }
    }

    /// Body of a `<value>` element through its `</value>`.
    ///
    /// Bare text is an untyped string and keeps its whitespace.
    fn parse_wrapped(&mut self) -> Result<Value> {
        let mut text = String::new();
        loop {
            match self.next_raw()? {
                Some(Event::Text(chunk)) => text.push_str(&chunk),
                Some(Event::End(tag)) if tag == VALUE => return Ok(Value::Text(text)),
                Some(Event::Start(tag)) => {
                    if !is_blank(&text) {
                        return Err(CodecError::UnexpectedText(text));
                    }
                    if tag == VALUE {
                        return Err(CodecError::unexpected("a type tag", "<value>"));
                    }
                    let value = self.parse_element(tag)?;
                    self.expect_end(VALUE)?;
                    return Ok(value);
                }
                Some(Event::End(tag)) => {
                    return Err(CodecError::unexpected("</value>", format!("</{tag}>")))
                }
                None => return Err(CodecError::PrematureEnd("</value>".into())),
            }
        }
    }

    fn parse_struct(&mut self) -> Result<Value> {
        let level = self.enter()?;
        tracing::trace!(depth = level, "struct opened");
        let mut record = Record::new();
        loop {
            match self.sibling(MEMBER)? {
                Parsed::Item(()) => {
                    let name = self.leaf(NAME)?;
                    self.expect_start(VALUE)?;
                    let value = self.parse_wrapped()?;
                    self.expect_end(MEMBER)?;
                    record.insert(name, value);
                }
                Parsed::Closed(close) => {
                    self.finish(close, STRUCT, level)?;
                    break;
                }
            }
        }
        self.leave();
        tracing::trace!(depth = level, members = record.len(), "struct closed");
        Ok(Value::Record(record))
    }

    fn parse_array(&mut self) -> Result<Value> {
        let level = self.enter()?;
        tracing::trace!(depth = level, "array opened");
        self.expect_start(DATA)?;
        let mut items = Vec::new();
        loop {
            match self.sibling(VALUE)? {
                Parsed::Item(()) => items.push(self.parse_wrapped()?),
                Parsed::Closed(close) => {
                    self.finish(close, DATA, level)?;
                    break;
                }
            }
        }
        self.expect_end(ARRAY)?;
        self.leave();
        tracing::trace!(depth = level, items = items.len(), "array closed");
        Ok(Value::List(items))
    }

    fn enter(&mut self) -> Result<usize> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(self.depth)
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
