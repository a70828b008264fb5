use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};

use xrpc_codec::{CodecConfig, EnvelopeReader, EnvelopeWriter};

use crate::error::Result;
use crate::server::{ServerConnection, TcpServerConnection};

/// Listens for and accepts client connections.
pub struct Listener {
    socket: TcpListener,
    config: CodecConfig,
    next_peer_id: AtomicU64,
}

impl Listener {
    /// Bind to a TCP address.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = TcpListener::bind(addr)?;
        tracing::debug!(addr = ?socket.local_addr().ok(), "listening");
        Ok(Self {
            socket,
            config: CodecConfig::default(),
            next_peer_id: AtomicU64::new(1),
        })
    }

    /// Override codec config for accepted connections.
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Accept next connection and assign an auto-generated peer id.
    pub fn accept(&self) -> Result<TcpServerConnection> {
        let id = self.next_peer_id.fetch_add(1, Ordering::Relaxed);
        self.accept_with_id(&format!("peer-{id}"))
    }

    /// Accept next connection and use explicit peer id.
    pub fn accept_with_id(&self, peer_id: &str) -> Result<TcpServerConnection> {
        let (stream, remote) = self.socket.accept()?;
        tracing::debug!(peer = peer_id, remote = %remote, "accepted");
        let reader_stream = stream.try_clone()?;

        let reader = EnvelopeReader::with_config_tcp(reader_stream, self.config.clone())?;
        let writer = EnvelopeWriter::with_config_tcp(stream, self.config.clone())?;

        Ok(ServerConnection::from_parts(peer_id, reader, writer))
    }

    /// Bound socket address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Current codec configuration for accepted connections.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}
