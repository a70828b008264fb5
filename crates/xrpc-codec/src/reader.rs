use std::io::{BufReader, Read};
use std::net::TcpStream;

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::envelope::{read_envelope, Envelope};
use crate::error::Result;
use crate::tokenizer::XmlTokenizer;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads complete envelopes from any `Read` stream.
///
/// One tokenizer and decoder live as long as the reader, so consecutive
/// envelopes on a connection decode in order and partial reads are handled
/// internally.
pub struct EnvelopeReader<T> {
    decoder: Decoder<XmlTokenizer<BufReader<T>>>,
    config: CodecConfig,
}

impl<T: Read> EnvelopeReader<T> {
    /// Create a new envelope reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new envelope reader with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        let buffered = BufReader::with_capacity(INITIAL_BUFFER_CAPACITY, inner);
        Self {
            decoder: Decoder::with_max_depth(XmlTokenizer::new(buffered), config.max_depth),
            config,
        }
    }

    /// Read the next complete envelope (blocking).
    ///
    /// Returns `Err(CodecError::ConnectionClosed)` when EOF is reached
    /// between envelopes. After an error for which
    /// [`CodecError::is_decode_error`] holds, the stream position is lost
    /// and further reads will most likely fail too; drop the connection.
    ///
    /// [`CodecError::is_decode_error`]: crate::CodecError::is_decode_error
    pub fn read_envelope(&mut self) -> Result<Envelope> {
        self.decoder.reset();
        let envelope = read_envelope(&mut self.decoder)?;
        tracing::debug!(
            kind = envelope.label(),
            method = envelope.method_name().unwrap_or(""),
            params = envelope.params().len(),
            "envelope read"
        );
        Ok(envelope)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        self.decoder.get_ref().get_ref().get_ref()
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        self.decoder.get_mut().get_mut().get_mut()
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Bytes already buffered but not yet decoded are lost.
    pub fn into_inner(self) -> T {
        self.decoder.into_inner().into_inner().into_inner()
    }

    /// Update the nesting limit for subsequent envelopes.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.config.max_depth = max_depth;
        self.decoder.set_max_depth(max_depth);
    }

    /// Current envelope reader configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl EnvelopeReader<TcpStream> {
    /// Create an envelope reader for a `TcpStream` and apply read timeout from config.
    pub fn with_config_tcp(inner: TcpStream, config: CodecConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
