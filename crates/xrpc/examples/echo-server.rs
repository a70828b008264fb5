//! Minimal echo server: accepts one client and answers each call with its
//! own parameters.
//!
//! Run with:
//!   cargo run --example echo-server --features peer
//!
//! In another terminal:
//!   cargo run --features cli -- call 127.0.0.1:8765 demo.echo --json '[1, "two"]'

use std::convert::Infallible;

use xrpc::peer::Listener;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = Listener::bind("127.0.0.1:8765")?;
    eprintln!("Listening on {}", listener.local_addr()?);

    let mut conn = listener.accept()?;
    eprintln!("Client connected: {}", conn.id());

    let served = conn.serve(|method, params| {
        eprintln!("{method}: {} params", params.len());
        Ok::<_, Infallible>(params)
    })?;

    eprintln!("Client disconnected after {served} calls");
    Ok(())
}
