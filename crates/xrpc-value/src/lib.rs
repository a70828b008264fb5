//! Dynamic value model for XML-RPC.
//!
//! This is the lowest layer of xrpc. Every payload exchanged on the wire is a
//! tree of [`Value`]s:
//! - scalars: boolean, integer, double, string, dateTime, base64 binary
//! - containers: array ([`Value::List`]) and struct ([`Value::Record`])
//! - a [`Fault`], which replaces the parameter list of a failed response
//!
//! Native Rust values reach the model through serde (see [`to_value`]), so the
//! type mapping is checked at compile time instead of inspected at run time.

pub mod error;
pub mod fault;
pub mod kind;
pub mod ser;
pub mod value;

pub use error::{Result, ValueError};
pub use fault::Fault;
pub use kind::{
    Kind, ARRAY, BASE64, BOOLEAN, DATE_TIME, DOUBLE, INT, STRING, STRUCT, VALUE,
};
pub use ser::{to_value, ByteBuf, Iso8601, ValueSerializer};
pub use value::{Record, Timestamp, Value};
