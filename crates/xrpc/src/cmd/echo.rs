use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use xrpc_peer::Listener;
use xrpc_value::{Fault, Value};

use crate::cmd::EchoArgs;
use crate::exit::{peer_error, CliError, CliResult, SUCCESS};

/// Method answered with a fault instead of an echo.
///
/// Params: optional fault code, optional fault string.
pub const FAULT_METHOD: &str = "system.fault";

const IDLE: u8 = 0;
const BUSY: u8 = 1;
const STOPPING: u8 = 2;

/// Whether the server is between calls or answering one.
///
/// Accept and read block without a timeout, so a stop request that arrives
/// while idle cannot be observed by the loop; the handler exits instead.
#[derive(Debug, Default)]
struct Shutdown {
    state: AtomicU8,
}

impl Shutdown {
    /// Mark a call as in progress. False once a stop was requested.
    fn begin(&self) -> bool {
        self.state
            .compare_exchange(IDLE, BUSY, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Mark the call as answered. False if a stop arrived meanwhile.
    fn end(&self) -> bool {
        self.state
            .compare_exchange(BUSY, IDLE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Request a stop. True when nothing is in flight and the process may
    /// exit right away.
    fn request(&self) -> bool {
        self.state.swap(STOPPING, Ordering::SeqCst) == IDLE
    }
}

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let listener =
        Listener::bind(args.addr.as_str()).map_err(|err| peer_error("bind failed", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| peer_error("bind failed", err))?;

    let shutdown = Arc::new(Shutdown::default());
    install_ctrlc_handler(shutdown.clone())?;

    println!("listening on {addr}");
    tracing::info!(%addr, "echo server ready");

    let mut served = 0u64;
    loop {
        let mut conn = listener
            .accept()
            .map_err(|err| peer_error("accept failed", err))?;

        loop {
            let (method, params) = match conn.read_call() {
                Ok(Some(call)) => call,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(peer = conn.id(), error = %err, "dropping connection");
                    break;
                }
            };
            if !shutdown.begin() {
                return Ok(SUCCESS);
            }

            tracing::info!(
                peer = conn.id(),
                method = %method,
                params = params.len(),
                "echoing call"
            );

            let replied = conn.reply_result(answer(&method, params));
            if !shutdown.end() {
                return Ok(SUCCESS);
            }
            if let Err(err) = replied {
                tracing::warn!(peer = conn.id(), error = %err, "reply failed");
                break;
            }

            served += 1;
            if args.count.is_some_and(|limit| served >= limit) {
                return Ok(SUCCESS);
            }
        }
    }
}

fn answer(method: &str, params: Vec<Value>) -> Result<Vec<Value>, Fault> {
    if method != FAULT_METHOD {
        return Ok(params);
    }
    let code = params.first().and_then(Value::as_i64).unwrap_or(1);
    let message = params
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or("requested fault");
    Err(Fault::new(code, message))
}

fn install_ctrlc_handler(shutdown: Arc<Shutdown>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        if shutdown.request() {
            tracing::info!("interrupted while idle");
            std::process::exit(SUCCESS);
        }
        tracing::info!("interrupted, finishing the current call");
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
