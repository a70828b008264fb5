use xrpc_codec::CodecError;
use xrpc_value::{Fault, ValueError};

/// Errors that can occur in client and server exchanges.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Encoding, decoding or stream error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Socket setup error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Arguments could not be mapped to values.
    #[error("invalid arguments: {0}")]
    Value(#[from] ValueError),

    /// The remote side answered with a fault.
    #[error("remote fault {0}")]
    Fault(Fault),

    /// A message arrived that does not fit the exchange.
    #[error("unexpected {0} envelope")]
    UnexpectedEnvelope(&'static str),
}

impl PeerError {
    /// True for an application fault returned by the remote side.
    pub fn is_fault(&self) -> bool {
        matches!(self, PeerError::Fault(_))
    }

    /// The remote fault, if this is one.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            PeerError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
