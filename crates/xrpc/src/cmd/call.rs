use xrpc_codec::{CodecConfig, Envelope};
use xrpc_peer::{connect_with_config, PeerError};

use crate::cmd::{parse_duration, CallArgs};
use crate::exit::{peer_error, CliResult, FAILURE, SUCCESS};
use crate::json::params_from_json;
use crate::output::{print_envelope, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let params = match &args.json {
        Some(json) => params_from_json(json)?,
        None => Vec::new(),
    };

    let config = CodecConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..CodecConfig::default()
    };
    let mut client = connect_with_config(args.addr.as_str(), config, Some(timeout))
        .map_err(|err| peer_error("connect failed", err))?;

    match client.call(&args.method, params) {
        Ok(results) => {
            print_envelope(&Envelope::response(results), format);
            Ok(SUCCESS)
        }
        Err(PeerError::Fault(fault)) => {
            tracing::info!(code = fault.code, "call returned a fault");
            print_envelope(&Envelope::Fault(fault), format);
            Ok(FAILURE)
        }
        Err(err) => Err(peer_error("call failed", err)),
    }
}
