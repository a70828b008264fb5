use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod decode;
pub mod echo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode JSON params as a call or response envelope.
    Encode(EncodeArgs),
    /// Decode an envelope and print it.
    Decode(DecodeArgs),
    /// Perform one call against a server.
    Call(CallArgs),
    /// Start an echo server.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Echo(args) => echo::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Method name; encodes a call instead of a response.
    #[arg(long, short = 'm', conflicts_with_all = ["fault_code", "fault_string"])]
    pub method: Option<String>,
    /// JSON params (an array spreads into several params).
    #[arg(long, conflicts_with_all = ["file", "fault_code", "fault_string"])]
    pub json: Option<String>,
    /// Read JSON params from file.
    #[arg(long, conflicts_with_all = ["json", "fault_code", "fault_string"])]
    pub file: Option<PathBuf>,
    /// Encode a fault response with this code.
    #[arg(long, requires = "fault_string", allow_hyphen_values = true)]
    pub fault_code: Option<i64>,
    /// Fault message.
    #[arg(long, requires = "fault_code")]
    pub fault_string: Option<String>,
    /// Prefix the output with an XML declaration.
    #[arg(long)]
    pub declaration: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding the envelope. Reads stdin when omitted.
    pub path: Option<PathBuf>,
    /// Maximum container nesting depth.
    #[arg(long, default_value_t = xrpc_codec::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Server address (host:port).
    pub addr: String,
    /// Method to call.
    pub method: String,
    /// JSON params (an array spreads into several params).
    #[arg(long)]
    pub json: Option<String>,
    /// Connect, read and write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind (host:port). Port 0 picks a free port.
    pub addr: String,
    /// Exit after answering N calls.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
