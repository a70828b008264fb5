use xrpc_value::ValueError;

/// Errors that can occur while encoding or decoding XML-RPC messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The XML itself is malformed (lexical level).
    #[error("malformed xml at byte {position}: {message}")]
    Tokenizer { position: u64, message: String },

    /// Text outside a stream holds a bad entity or character reference.
    #[error("invalid entity reference: {0}")]
    Entity(#[from] quick_xml::escape::EscapeError),

    /// An I/O error occurred on the underlying stream.
    #[error("codec I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A specific tag was required but another one was found.
    #[error("expected {expected}, found {found}")]
    UnexpectedTag { expected: String, found: String },

    /// A tag in value position is not a known value tag.
    #[error("cannot parse unknown value tag <{0}>")]
    UnknownTag(String),

    /// Non-whitespace character data where only tags are allowed.
    #[error("unexpected character data {0:?}")]
    UnexpectedText(String),

    /// A scalar body does not parse as its declared type.
    #[error("invalid <{tag}> body {text:?}: {reason}")]
    ScalarFormat {
        tag: String,
        text: String,
        reason: String,
    },

    /// The stream ended while an element was still open.
    #[error("stream ended while expecting {0}")]
    PrematureEnd(String),

    /// Containers are nested deeper than the configured limit.
    #[error("nesting depth exceeds limit of {max}")]
    DepthExceeded { max: usize },

    /// A fault response lacks `faultCode`/`faultString` or has the wrong types.
    #[error("malformed fault: {0}")]
    MalformedFault(String),

    /// A method call must carry a non-empty method name.
    #[error("method call has an empty method name")]
    EmptyMethodName,

    /// The stream ended cleanly before the first tag of a message.
    #[error("connection closed (no message)")]
    ConnectionClosed,

    /// A native value has no wire representation.
    #[error(transparent)]
    Value(#[from] ValueError),
}

impl CodecError {
    /// Returns true if the error leaves the stream position untrustworthy.
    ///
    /// Callers should stop reusing the stream after such an error.
    pub fn is_decode_error(&self) -> bool {
        !matches!(
            self,
            CodecError::Value(_) | CodecError::EmptyMethodName | CodecError::ConnectionClosed
        )
    }

    pub(crate) fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CodecError::UnexpectedTag {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn scalar(tag: &str, text: &str, reason: impl ToString) -> Self {
        CodecError::ScalarFormat {
            tag: tag.to_owned(),
            text: text.to_owned(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
