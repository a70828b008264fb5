#![cfg(feature = "cli")]

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

const CALL_XML: &str = "<methodCall><methodName>sum</methodName><params>\
    <param><value><int>1</int></value></param>\
    <param><value><string>two</string></value></param>\
    </params></methodCall>";

fn xrpc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_xrpc"))
}

fn decode_stdin(input: &str, format: &str) -> std::process::Output {
    let mut child = xrpc()
        .args(["--format", format, "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input.as_bytes())
        .expect("stdin should accept input");
    child.wait_with_output().expect("decode should finish")
}

/// Start `xrpc echo` on a free port and return the child and its address.
fn start_echo(count: u64) -> (Child, String) {
    let mut child = xrpc()
        .args(["echo", "127.0.0.1:0", "--count", &count.to_string()])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("echo should start");
    let stdout = child.stdout.take().expect("stdout should be piped");
    let mut line = String::new();
    BufReader::new(stdout)
        .read_line(&mut line)
        .expect("echo should announce its address");
    let addr = line
        .trim()
        .strip_prefix("listening on ")
        .expect("announcement should name the address")
        .to_string();
    (child, addr)
}

#[test]
fn encode_call_is_byte_exact() {
    let output = xrpc()
        .args(["encode", "--method", "sum", "--json", r#"[1, "two"]"#])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{CALL_XML}\n"));
}

#[test]
fn encode_fault_with_declaration() {
    let output = xrpc()
        .args([
            "encode",
            "--fault-code",
            "4",
            "--fault-string",
            "Too many parameters.",
            "--declaration",
        ])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<?xml version=\"1.0\"?><methodResponse><fault>"));
    assert!(stdout.contains("<string>Too many parameters.</string>"));
}

#[test]
fn encode_null_param_is_invalid_data() {
    let output = xrpc()
        .args(["encode", "--json", "[null]"])
        .output()
        .expect("encode should run");

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_prints_json() {
    let output = decode_stdin(CALL_XML, "json");

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("decode should emit json");
    assert_eq!(payload["kind"], "call");
    assert_eq!(payload["method"], "sum");
    assert_eq!(payload["params"], serde_json::json!([1, "two"]));
}

#[test]
fn decode_malformed_returns_60() {
    let output = decode_stdin("<methodCall><methodName>x</methodName><params><param><value><nil/>", "json");
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("decode failed"));
}

#[test]
fn call_against_echo_server() {
    let (mut server, addr) = start_echo(2);

    let output = xrpc()
        .args(["--format", "json", "call", &addr, "demo.echo", "--json", r#"[1, "two", {"k": true}]"#])
        .output()
        .expect("call should run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("call should emit json");
    assert_eq!(payload["kind"], "response");
    assert_eq!(payload["params"], serde_json::json!([1, "two", {"k": true}]));

    let output = xrpc()
        .args([
            "--format",
            "json",
            "call",
            &addr,
            "system.fault",
            "--json",
            r#"[4, "Too many parameters."]"#,
        ])
        .output()
        .expect("call should run");
    assert_eq!(output.status.code(), Some(1));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("fault should emit json");
    assert_eq!(payload["kind"], "fault");
    assert_eq!(payload["fault_code"], 4);
    assert_eq!(payload["fault_string"], "Too many parameters.");

    let status = server.wait().expect("echo should exit after two calls");
    assert!(status.success());
}

#[cfg(unix)]
#[test]
fn echo_stops_on_interrupt_while_idle() {
    let (mut server, _addr) = start_echo(5);

    let status = Command::new("kill")
        .args(["-INT", &server.id().to_string()])
        .status()
        .expect("kill should run");
    assert!(status.success());

    let status = server.wait().expect("echo should exit on SIGINT");
    assert_eq!(status.code(), Some(0));
}

#[test]
fn call_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("port should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    drop(listener);

    let output = xrpc()
        .args(["call", &addr.to_string(), "demo.echo", "--timeout", "1s"])
        .output()
        .expect("call should run");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn version_reports_package_version() {
    let output = xrpc().arg("version").output().expect("version should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("xrpc {}", env!("CARGO_PKG_VERSION"))
    );
}
