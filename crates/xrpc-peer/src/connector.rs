use std::io::{Error as IoError, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use xrpc_codec::{CodecConfig, EnvelopeReader, EnvelopeWriter};

use crate::client::{Client, TcpClient};
use crate::error::Result;

/// Connect to a listening server as a client.
pub fn connect(addr: impl ToSocketAddrs) -> Result<TcpClient> {
    connect_with_config(addr, CodecConfig::default(), None)
}

/// Connect with explicit configuration.
///
/// Every resolved address is tried in turn; `connect_timeout` bounds each
/// attempt. The codec timeouts apply to the established stream.
pub fn connect_with_config(
    addr: impl ToSocketAddrs,
    config: CodecConfig,
    connect_timeout: Option<Duration>,
) -> Result<TcpClient> {
    let mut last_err = None;
    for candidate in addr.to_socket_addrs()? {
        let attempt = match connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
            None => TcpStream::connect(candidate),
        };
        match attempt {
            Ok(stream) => {
                tracing::debug!(addr = %candidate, "connected");
                stream.set_nodelay(true)?;
                let reader_stream = stream.try_clone()?;
                let reader = EnvelopeReader::with_config_tcp(reader_stream, config.clone())?;
                let writer = EnvelopeWriter::with_config_tcp(stream, config)?;
                return Ok(Client::from_parts(reader, writer));
            }
            Err(err) => {
                tracing::debug!(addr = %candidate, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| IoError::new(ErrorKind::InvalidInput, "address resolved to nothing"))
        .into())
}

#[cfg(test)]
mod tests {
    use std::thread;

    use xrpc_value::Value;

    use super::*;
    use crate::listener::Listener;

    #[test]
    fn connect_convenience() {
        let listener = Listener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");

        let server = thread::spawn(move || {
            let mut conn = listener.accept().expect("listener should accept");
            let (_, params) = conn
                .read_call()
                .expect("should read call")
                .expect("call should arrive");
            conn.reply(&params).expect("should echo params");
        });

        let mut client = connect(addr).expect("client should connect");
        let result = client
            .call("echo", vec![Value::from("hello")])
            .expect("call should succeed");
        assert_eq!(result, vec![Value::from("hello")]);

        server.join().expect("server thread should complete");
    }

    #[test]
    fn connect_applies_timeouts() {
        let listener = Listener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("listener should have an address");
        let config = CodecConfig {
            read_timeout: Some(Duration::from_millis(20)),
            write_timeout: Some(Duration::from_millis(20)),
            ..CodecConfig::default()
        };

        let server = thread::spawn(move || {
            let mut conn = listener.accept().expect("listener should accept");
            // Read the call but never answer it.
            let _ = conn.read_call();
            thread::sleep(Duration::from_millis(200));
        });

        let mut client = connect_with_config(addr, config, Some(Duration::from_secs(1)))
            .expect("client should connect");
        let err = client.call("slow", vec![]).unwrap_err();
        assert!(!err.is_fault());

        server.join().expect("server thread should complete");
    }

    #[test]
    fn connect_refused_is_io_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connect(addr).err().expect("connect should fail");
        assert!(matches!(err, crate::PeerError::Io(_)), "{err:?}");
    }
}
