//! Structural tag names of the envelope grammar.
//!
//! Value tags live in [`xrpc_value::kind`] and are re-exported here.

pub use xrpc_value::kind::{ARRAY, BASE64, BOOLEAN, DATE_TIME, DOUBLE, INT, STRING, STRUCT, VALUE};

pub const METHOD_CALL: &str = "methodCall";
pub const METHOD_RESPONSE: &str = "methodResponse";
pub const METHOD_NAME: &str = "methodName";
pub const PARAMS: &str = "params";
pub const PARAM: &str = "param";
pub const FAULT: &str = "fault";
pub const MEMBER: &str = "member";
pub const NAME: &str = "name";
pub const DATA: &str = "data";

/// Struct member holding the integer code of a fault.
pub const FAULT_CODE: &str = "faultCode";
/// Struct member holding the message of a fault.
pub const FAULT_STRING: &str = "faultString";
