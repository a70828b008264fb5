//! Blocking XML-RPC exchange over byte streams.
//!
//! This is the "just works" layer. A [`Client`] sends a call and waits for
//! its response; a [`ServerConnection`] reads calls and answers them. Both
//! work over any `Read`/`Write` pair; [`connect`] and [`Listener`] set them
//! up over TCP.
//!
//! Application faults and transport failures stay separate: a fault from
//! the remote side is [`PeerError::Fault`], everything else is a codec or
//! I/O error.

pub mod client;
pub mod connector;
pub mod error;
pub mod listener;
pub mod server;

pub use client::{Client, TcpClient};
pub use connector::{connect, connect_with_config};
pub use error::{PeerError, Result};
pub use listener::Listener;
pub use server::{ServerConnection, TcpServerConnection};
