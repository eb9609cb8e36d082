use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use marshaler_testkit::{fixture_path as shared_fixture_path, target_dir as workspace_target_dir};

static MARSHALER_BIN: OnceLock<PathBuf> = OnceLock::new();

const INVENTORY_SCHEMA: &str = "inventory.schema.json";

fn fixture_arg(name: &str) -> String {
	shared_fixture_path(name).to_string_lossy().into_owned()
}

/// `marshaler types` over the inventory schema fixture.
pub(crate) fn inventory_types(extra: &[&str]) -> Output {
	let schema = fixture_arg(INVENTORY_SCHEMA);
	let mut args = vec!["types", schema.as_str()];
	args.extend_from_slice(extra);
	run_marshaler(&args)
}

/// `marshaler resolve` of a data fixture against the inventory schema fixture.
pub(crate) fn resolve_inventory(target: &str, data: &str, extra: &[&str]) -> Output {
	let schema = fixture_arg(INVENTORY_SCHEMA);
	let data = fixture_arg(data);
	let mut args = vec!["resolve", schema.as_str(), target, data.as_str()];
	args.extend_from_slice(extra);
	run_marshaler(&args)
}

pub(crate) fn resolve_inventory_json(target: &str, data: &str, extra: &[&str]) -> serde_json::Value {
	let mut flags = extra.to_vec();
	flags.push("--json");
	json_stdout(resolve_inventory(target, data, &flags))
}

/// Stderr of a run expected to exit with status 1.
pub(crate) fn failure_stderr(output: &Output) -> String {
	let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
	assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
	assert!(stderr.starts_with("error: "), "stderr: {stderr}");
	stderr
}

pub(crate) fn run_marshaler(args: &[&str]) -> Output {
	Command::new(marshaler_bin()).args(args).output().expect("marshaler command executes")
}

pub(crate) fn json_stdout(output: Output) -> serde_json::Value {
	assert!(
		output.status.success(),
		"marshaler command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn marshaler_bin() -> &'static PathBuf {
	MARSHALER_BIN.get_or_init(resolve_marshaler_bin)
}

fn resolve_marshaler_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_marshaler") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "marshaler.exe" } else { "marshaler" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "marshaler"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build marshaler binary at {}", bin.display());

	bin
}
