/// Errors raised while mapping native values into the value model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The native shape has no wire representation.
    #[error("unsupported native type: {0}")]
    Unsupported(String),

    /// A `Serialize` implementation reported its own error.
    #[error("serialization failed: {0}")]
    Custom(String),
}

impl serde::ser::Error for ValueError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ValueError::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ValueError>;
