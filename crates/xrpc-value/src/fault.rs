use std::fmt;

/// Structured error carried by a fault response.
///
/// A fault replaces the whole parameter list of a response; it is never mixed
/// with ordinary parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fault {
    /// Application-defined fault code (`faultCode`).
    pub code: i64,
    /// Human-readable description (`faultString`).
    pub message: String,
}

impl Fault {
    /// Code used when an arbitrary error is normalized into a fault.
    pub const GENERIC_CODE: i64 = -1;

    /// Create a new fault.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Normalize any error into a fault.
    ///
    /// A `Fault` keeps its own code and message; every other error becomes
    /// `Fault { code: -1, message: err.to_string() }`.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        match err.downcast_ref::<Fault>() {
            Some(fault) => fault.clone(),
            None => Self::new(Self::GENERIC_CODE, err.to_string()),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Fault {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("divide by zero")]
    struct DivideByZero;

    #[test]
    fn display_matches_code_and_message() {
        let fault = Fault::new(4, "Too many parameters.");
        assert_eq!(fault.to_string(), "4: Too many parameters.");
    }

    #[test]
    fn generic_error_normalizes_to_minus_one() {
        let fault = Fault::from_error(&DivideByZero);
        assert_eq!(fault, Fault::new(-1, "divide by zero"));
    }

    #[test]
    fn fault_error_keeps_its_code() {
        let boxed: Box<dyn std::error::Error> = Box::new(Fault::new(42, "nope"));
        let fault = Fault::from_error(boxed.as_ref());
        assert_eq!(fault.code, 42);
        assert_eq!(fault.message, "nope");
    }
}
