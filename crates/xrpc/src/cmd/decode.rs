use std::fs;
use std::io::Read;

use xrpc_codec::{decode_envelope_with_config, CodecConfig};

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, io_error, CliResult, SUCCESS};
use crate::output::{print_envelope, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = match &args.path {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            buf
        }
    };

    let config = CodecConfig {
        max_depth: args.max_depth,
        ..CodecConfig::default()
    };
    let envelope =
        decode_envelope_with_config(&bytes, &config).map_err(|err| codec_error("decode failed", err))?;
    tracing::debug!(kind = envelope.label(), bytes = bytes.len(), "decoded envelope");

    print_envelope(&envelope, format);
    Ok(SUCCESS)
}
