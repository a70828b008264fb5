//! Streaming XML-RPC codec.
//!
//! This layer turns [`Value`](xrpc_value::Value) trees into XML and back,
//! and frames them as method calls and responses:
//! - a tokenizer adapter over `quick-xml` that yields start, end and text events
//! - a pull [`Decoder`] with one pushback slot and a nesting limit
//! - a deterministic encoder with no whitespace between tags
//! - [`EnvelopeReader`]/[`EnvelopeWriter`] for consecutive messages on a stream
//!
//! Messages are delimited by their root element; there is no length prefix
//! and no HTTP framing.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod escape;
pub mod reader;
pub mod scalar;
pub mod tags;
pub mod tokenizer;
pub mod writer;

pub use config::{CodecConfig, DEFAULT_MAX_DEPTH, XML_DECLARATION};
pub use decoder::{Close, Decoder, Parsed};
pub use encoder::{encode_value, value_to_xml};
pub use envelope::{
    decode_envelope, decode_envelope_with_config, encode_call, encode_envelope, encode_fault,
    encode_response, read_envelope, Envelope,
};
pub use error::{CodecError, Result};
pub use escape::{escape, unescape};
pub use reader::EnvelopeReader;
pub use tokenizer::{Event, EventSource, XmlTokenizer};
pub use writer::EnvelopeWriter;
