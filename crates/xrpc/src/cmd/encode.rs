use std::fs;
use std::io::Write;

use xrpc_codec::{CodecConfig, Envelope, EnvelopeWriter};

use crate::cmd::EncodeArgs;
use crate::exit::{codec_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::json::params_from_json;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let envelope = build_envelope(&args)?;
    let config = CodecConfig {
        xml_declaration: args.declaration,
        ..CodecConfig::default()
    };

    let stdout = std::io::stdout();
    let mut writer = EnvelopeWriter::with_config(stdout.lock(), config);
    writer
        .write_envelope(&envelope)
        .map_err(|err| codec_error("encode failed", err))?;
    writeln!(writer.get_mut()).map_err(|err| io_error("write failed", err))?;

    Ok(SUCCESS)
}

fn build_envelope(args: &EncodeArgs) -> CliResult<Envelope> {
    if let (Some(code), Some(message)) = (args.fault_code, &args.fault_string) {
        return Ok(Envelope::fault(code, message.clone()));
    }

    let params = if let Some(json) = &args.json {
        params_from_json(json)?
    } else if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        params_from_json(&text)?
    } else {
        Vec::new()
    };

    match &args.method {
        Some(name) if name.trim().is_empty() => {
            Err(CliError::new(USAGE, "--method must not be empty"))
        }
        Some(name) => Ok(Envelope::call(name.clone(), params)),
        None => Ok(Envelope::response(params)),
    }
}
