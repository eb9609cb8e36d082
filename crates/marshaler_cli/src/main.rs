#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "marshaler", about = "Resolve JSON data against typed schema documents")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Resolve a data file into a named schema type.
	Resolve(cmd::resolve::Args),
	/// List the types a schema document defines.
	Types(cmd::types::Args),
}

fn main() {
	init_tracing();
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run() -> marshaler::marshal::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Resolve(args) => cmd::resolve::run(args),
		Commands::Types(args) => cmd::types::run(args),
	}
}
