use std::io::{Read, Write};
use std::net::TcpStream;

use serde::Serialize;
use xrpc_codec::{CodecConfig, Envelope, EnvelopeReader, EnvelopeWriter};
use xrpc_value::{to_value, Value};

use crate::error::{PeerError, Result};

/// A client over TCP.
pub type TcpClient = Client<TcpStream, TcpStream>;

/// Calling side of a connection.
///
/// Calls are strictly sequential: each call waits for its response before
/// the next one is sent.
pub struct Client<R, W> {
    reader: EnvelopeReader<R>,
    writer: EnvelopeWriter<W>,
}

impl<R: Read, W: Write> Client<R, W> {
    /// Create a client over a read half and a write half.
    pub fn new(read: R, write: W) -> Self {
        Self::with_config(read, write, CodecConfig::default())
    }

    pub fn with_config(read: R, write: W, config: CodecConfig) -> Self {
        Self::from_parts(
            EnvelopeReader::with_config(read, config.clone()),
            EnvelopeWriter::with_config(write, config),
        )
    }

    /// Assemble a client from an existing reader and writer.
    pub fn from_parts(reader: EnvelopeReader<R>, writer: EnvelopeWriter<W>) -> Self {
        Self { reader, writer }
    }

    /// Call `method` and wait for its result.
    ///
    /// A fault response comes back as [`PeerError::Fault`].
    pub fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Vec<Value>> {
        self.writer.write_call(method, &params)?;
        match self.reader.read_envelope()? {
            Envelope::Response { params } => {
                tracing::debug!(method, results = params.len(), "call returned");
                Ok(params)
            }
            Envelope::Fault(fault) => {
                tracing::debug!(method, code = fault.code, "call faulted");
                Err(PeerError::Fault(fault))
            }
            other => Err(PeerError::UnexpectedEnvelope(other.label())),
        }
    }

    /// Call `method` with serde-serializable arguments.
    ///
    /// A tuple or sequence becomes one parameter per element; anything else
    /// is sent as a single parameter.
    pub fn call_with<A>(&mut self, method: &str, args: &A) -> Result<Vec<Value>>
    where
        A: Serialize + ?Sized,
    {
        let params = match to_value(args)? {
            Value::List(items) => items,
            single => vec![single],
        };
        self.call(method, params)
    }

    /// Borrow the envelope reader.
    pub fn reader(&self) -> &EnvelopeReader<R> {
        &self.reader
    }

    /// Borrow the envelope writer.
    pub fn writer(&self) -> &EnvelopeWriter<W> {
        &self.writer
    }

    /// Split the client back into its reader and writer.
    pub fn into_parts(self) -> (EnvelopeReader<R>, EnvelopeWriter<W>) {
        (self.reader, self.writer)
    }
}
