//! XML-RPC for Rust: dynamic values, a streaming codec and blocking peers.
//!
//! # Crate Structure
//!
//! - [`value`]: the dynamic [`Value`](value::Value) model and serde mapping
//! - [`codec`]: XML encoding and decoding of values and envelopes
//! - [`peer`]: client and server connections over byte streams (behind `peer` feature)

/// Re-export value types.
pub mod value {
    pub use xrpc_value::*;
}

/// Re-export codec types.
pub mod codec {
    pub use xrpc_codec::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use xrpc_peer::*;
}
