use std::io::{ErrorKind, Write};
use std::net::TcpStream;

use bytes::BytesMut;
use xrpc_value::{Fault, Value};

use crate::config::CodecConfig;
use crate::envelope::{encode_call, encode_envelope, encode_fault, encode_response, Envelope};
use crate::error::{CodecError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete envelopes to any `Write` stream.
///
/// Each envelope is encoded in full before the first byte is written, so an
/// encoding error never leaves a partial message on the stream.
pub struct EnvelopeWriter<T> {
    inner: T,
    buf: BytesMut,
    config: CodecConfig,
}

impl<T: Write> EnvelopeWriter<T> {
    /// Create a new envelope writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create a new envelope writer with explicit configuration.
    pub fn with_config(inner: T, config: CodecConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete envelope (blocking).
    pub fn write_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        self.buf.clear();
        encode_envelope(envelope, &mut self.buf, &self.config)?;
        tracing::debug!(
            kind = envelope.label(),
            method = envelope.method_name().unwrap_or(""),
            params = envelope.params().len(),
            bytes = self.buf.len(),
            "envelope written"
        );
        self.send_buffer()
    }

    /// Encode and send a method call.
    pub fn write_call(&mut self, name: &str, params: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_call(name, params, &mut self.buf, &self.config)?;
        tracing::debug!(method = name, params = params.len(), "call written");
        self.send_buffer()
    }

    /// Encode and send a successful response.
    pub fn write_response(&mut self, params: &[Value]) -> Result<()> {
        self.buf.clear();
        encode_response(params, &mut self.buf, &self.config)?;
        tracing::debug!(params = params.len(), "response written");
        self.send_buffer()
    }

    /// Encode and send a fault response.
    pub fn write_fault(&mut self, fault: &Fault) -> Result<()> {
        self.buf.clear();
        encode_fault(fault, &mut self.buf, &self.config);
        tracing::debug!(code = fault.code, "fault written");
        self.send_buffer()
    }

    fn send_buffer(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(CodecError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CodecError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(CodecError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Toggle the XML declaration prefix for subsequent envelopes.
    pub fn set_xml_declaration(&mut self, enabled: bool) {
        self.config.xml_declaration = enabled;
    }

    /// Current envelope writer configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl EnvelopeWriter<TcpStream> {
    /// Create an envelope writer for a `TcpStream` and apply write timeout from config.
    pub fn with_config_tcp(inner: TcpStream, config: CodecConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
