use clap::Parser;
use std::process::ExitCode;
use zk_ceremony::cli::{init_logging, parse_args, report, WorkspaceArgs};
use zk_ceremony::publish::publish_circuit;
use zk_ceremony::CircuitName;

/// Copies the witness generator and keys into the front end's static circuits directory.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    circuit_name: String,

    #[command(flatten)]
    workspace: WorkspaceArgs,
}

fn run(cli: Cli) -> zk_ceremony::Result<()> {
    let circuit = CircuitName::parse(&cli.circuit_name)?;
    let config = cli.workspace.into_config()?;
    println!("📦 Publishing {}...", circuit);
    let published = publish_circuit(&config, &circuit)?;
    println!("🎉 Published {} files", published.len());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    report("Publishing failed", run(cli))
}
