use clap::Parser;
use std::process::ExitCode;
use zk_ceremony::cli::{init_logging, parse_args, report, WorkspaceArgs};
use zk_ceremony::{CircuitName, InteractiveEntropy, Snarkjs, TrustedSetupCeremony};

/// Runs the full ceremony: powers of tau, then the circuit-specific setup.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Circuit base name; `<build-dir>/<circuit_name>.r1cs` must already exist
    circuit_name: String,

    #[command(flatten)]
    workspace: WorkspaceArgs,
}

// cargo run --release --bin trusted_setup -- KnowFactorsOf33

fn run(cli: Cli) -> zk_ceremony::Result<()> {
    let circuit = CircuitName::parse(&cli.circuit_name)?;
    let config = cli.workspace.into_config()?;
    let mut toolchain = Snarkjs::new(&config.snarkjs, config.verbose);
    let mut entropy = InteractiveEntropy::stdin();

    let result = TrustedSetupCeremony::new(config, circuit).run(&mut toolchain, &mut entropy)?;
    println!("\n{}", result);
    println!("\n🎉 Trusted setup ceremony completed successfully!");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    report("Setup failed", run(cli))
}
