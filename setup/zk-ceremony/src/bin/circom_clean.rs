use clap::Parser;
use std::process::ExitCode;
use zk_ceremony::cli::{init_logging, parse_args, report, WorkspaceArgs};
use zk_ceremony::{CircuitName, WorkspaceCleaner};

/// Deletes the build workspace and the circuit's published artifacts.
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
    println!("🧹 Cleaning artifacts for {}...", circuit);
    WorkspaceCleaner::new(&config.workspace_dir, config.published().circuit_dir(&circuit))
        .clean()?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    report("Error during cleanup", run(cli))
}
