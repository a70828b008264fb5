use std::io::{Read, Write};
use std::net::TcpStream;

use xrpc_codec::{CodecConfig, CodecError, Envelope, EnvelopeReader, EnvelopeWriter};
use xrpc_value::{Fault, Value};

use crate::error::{PeerError, Result};

/// A server connection over TCP.
pub type TcpServerConnection = ServerConnection<TcpStream, TcpStream>;

/// Answering side of one connection.
pub struct ServerConnection<R, W> {
    id: String,
    reader: EnvelopeReader<R>,
    writer: EnvelopeWriter<W>,
}

impl<R: Read, W: Write> ServerConnection<R, W> {
    /// Create a connection over a read half and a write half.
    pub fn new(id: impl Into<String>, read: R, write: W) -> Self {
        Self::with_config(id, read, write, CodecConfig::default())
    }

    pub fn with_config(id: impl Into<String>, read: R, write: W, config: CodecConfig) -> Self {
        Self::from_parts(
            id,
            EnvelopeReader::with_config(read, config.clone()),
            EnvelopeWriter::with_config(write, config),
        )
    }

    pub fn from_parts(
        id: impl Into<String>,
        reader: EnvelopeReader<R>,
        writer: EnvelopeWriter<W>,
    ) -> Self {
        Self {
            id: id.into(),
            reader,
            writer,
        }
    }

    /// Connection identifier, used in logs.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read the next call.
    ///
    /// Returns `Ok(None)` when the peer closes the connection between calls.
    pub fn read_call(&mut self) -> Result<Option<(String, Vec<Value>)>> {
        match self.reader.read_envelope() {
            Ok(Envelope::Call { name, params }) => {
                tracing::debug!(peer = %self.id, method = %name, params = params.len(), "call received");
                Ok(Some((name, params)))
            }
            Ok(other) => Err(PeerError::UnexpectedEnvelope(other.label())),
            Err(CodecError::ConnectionClosed) => {
                tracing::debug!(peer = %self.id, "connection closed by peer");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Answer the current call with result parameters.
    pub fn reply(&mut self, params: &[Value]) -> Result<()> {
        self.writer.write_response(params)?;
        Ok(())
    }

    /// Answer the current call with a fault.
    pub fn reply_fault(&mut self, fault: &Fault) -> Result<()> {
        self.writer.write_fault(fault)?;
        Ok(())
    }

    /// Answer with a handler result, turning an error into a fault.
    pub fn reply_result<E>(&mut self, result: std::result::Result<Vec<Value>, E>) -> Result<()>
    where
        E: std::error::Error + 'static,
    {
        match result {
            Ok(params) => match self.reply(&params) {
                // Unencodable results still get an answer.
                Err(PeerError::Codec(CodecError::Value(err))) => {
                    tracing::warn!(peer = %self.id, error = %err, "result not encodable, replying with fault");
                    self.reply_fault(&Fault::from_error(&err))
                }
                other => other,
            },
            Err(err) => {
                let fault = Fault::from_error(&err);
                tracing::warn!(
                    peer = %self.id,
                    code = fault.code,
                    message = %fault.message,
                    "handler error returned as fault"
                );
                self.reply_fault(&fault)
            }
        }
    }

    /// Answer calls with `handler` until the peer closes the connection.
    ///
    /// Returns the number of calls served.
    pub fn serve<F, E>(&mut self, mut handler: F) -> Result<u64>
    where
        F: FnMut(&str, Vec<Value>) -> std::result::Result<Vec<Value>, E>,
        E: std::error::Error + 'static,
    {
        let mut served = 0u64;
        while let Some((method, params)) = self.read_call()? {
            let result = handler(&method, params);
            self.reply_result(result)?;
            served += 1;
        }
        tracing::debug!(peer = %self.id, served, "connection finished");
        Ok(served)
    }

    /// Split the connection back into its reader and writer.
    pub fn into_parts(self) -> (EnvelopeReader<R>, EnvelopeWriter<W>) {
        (self.reader, self.writer)
    }
}
