use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xrpc_codec::Envelope;
use xrpc_value::Value;

use crate::json::value_to_json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Xml,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EnvelopeOutput<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault_string: Option<&'a str>,
}

impl<'a> EnvelopeOutput<'a> {
    fn new(envelope: &'a Envelope) -> Self {
        match envelope {
            Envelope::Call { name, params } => Self {
                kind: envelope.label(),
                method: Some(name),
                params: Some(params.iter().map(value_to_json).collect()),
                fault_code: None,
                fault_string: None,
            },
            Envelope::Response { params } => Self {
                kind: envelope.label(),
                method: None,
                params: Some(params.iter().map(value_to_json).collect()),
                fault_code: None,
                fault_string: None,
            },
            Envelope::Fault(fault) => Self {
                kind: envelope.label(),
                method: None,
                params: None,
                fault_code: Some(fault.code),
                fault_string: Some(&fault.message),
            },
        }
    }
}

pub fn print_envelope(envelope: &Envelope, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&EnvelopeOutput::new(envelope))
                    .unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => println!("{}", envelope_table(envelope)),
        OutputFormat::Pretty => print!("{}", pretty(envelope)),
        OutputFormat::Xml => match envelope.to_xml() {
            Ok(xml) => println!("{xml}"),
            Err(err) => tracing::warn!(error = %err, "envelope cannot be re-encoded"),
        },
    }
}

fn envelope_table(envelope: &Envelope) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    match envelope {
        Envelope::Fault(fault) => {
            table
                .set_header(vec!["FAULT CODE", "FAULT STRING"])
                .add_row(vec![fault.code.to_string(), fault.message.clone()]);
        }
        _ => {
            let header = match envelope.method_name() {
                Some(method) => format!("{method}: VALUE"),
                None => "VALUE".to_string(),
            };
            table.set_header(vec!["#".to_string(), "TYPE".to_string(), header]);
            for (index, param) in envelope.params().iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    param.type_name().to_string(),
                    render(param),
                ]);
            }
        }
    }
    table
}

fn pretty(envelope: &Envelope) -> String {
    match envelope {
        Envelope::Fault(fault) => format!("fault {}: {}\n", fault.code, fault.message),
        _ => {
            let mut out = match envelope.method_name() {
                Some(method) => format!("call {method}\n"),
                None => "response\n".to_string(),
            };
            for (index, param) in envelope.params().iter().enumerate() {
                out.push_str(&format!("  [{index}] {} {}\n", param.type_name(), render(param)));
            }
            out
        }
    }
}

fn render(value: &Value) -> String {
    value_to_json(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_for_each_kind() {
        let call = Envelope::call("m", vec![Value::Integer(1)]);
        assert_eq!(
            serde_json::to_string(&EnvelopeOutput::new(&call)).unwrap(),
            r#"{"kind":"call","method":"m","params":[1]}"#
        );
        let fault = Envelope::fault(4, "Too many parameters.");
        assert_eq!(
            serde_json::to_string(&EnvelopeOutput::new(&fault)).unwrap(),
            r#"{"kind":"fault","fault_code":4,"fault_string":"Too many parameters."}"#
        );
    }

    #[test]
    fn pretty_lists_params() {
        let response = Envelope::response(vec![Value::from("a"), Value::Boolean(false)]);
        assert_eq!(
            pretty(&response),
            "response\n  [0] string \"a\"\n  [1] boolean false\n"
        );
    }

    #[test]
    fn table_has_a_row_per_param() {
        let table = envelope_table(&Envelope::response(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(table.row_iter().count(), 2);
    }
}
