use std::fmt;
use std::io;

use xrpc_codec::CodecError;
use xrpc_peer::PeerError;

// Exit codes follow the sysexits-style table used across our tools.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

/// Errors from local input: the bytes or values handed to the tool are bad.
pub fn codec_error(context: &str, err: CodecError) -> CliError {
    match err {
        CodecError::Io(source) => io_error(context, source),
        CodecError::ConnectionClosed => CliError::new(DATA_INVALID, format!("{context}: empty input")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

/// Errors from a remote exchange: anything that is not a fault is a
/// transport or protocol failure.
pub fn peer_error(context: &str, err: PeerError) -> CliError {
    match err {
        PeerError::Io(source) | PeerError::Codec(CodecError::Io(source)) => io_error(context, source),
        PeerError::Value(err) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        PeerError::Codec(CodecError::Value(err)) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        PeerError::Codec(CodecError::EmptyMethodName) => {
            CliError::new(USAGE, format!("{context}: method name must not be empty"))
        }
        PeerError::Fault(fault) => CliError::new(FAILURE, format!("{context}: fault {fault}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}
