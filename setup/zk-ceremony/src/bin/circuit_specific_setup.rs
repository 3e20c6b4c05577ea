use clap::Parser;
use std::process::ExitCode;
use zk_ceremony::cli::{init_logging, parse_args, report, WorkspaceArgs};
use zk_ceremony::{CircuitName, InteractiveEntropy, Phase2Orchestrator, Snarkjs};

/// Runs only the circuit-specific phase against an existing final powers of tau.
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
    let orchestrator = Phase2Orchestrator::new(&config, &circuit);
    orchestrator.check_preconditions()?;

    let mut toolchain = Snarkjs::new(&config.snarkjs, config.verbose);
    let mut entropy = InteractiveEntropy::stdin();
    let report = orchestrator.run(&mut toolchain, &mut entropy)?;

    println!(
        "\n🎉 Phase 2 completed: {} steps in {:.2} seconds",
        report.completed.len(),
        report.elapsed.as_secs_f64()
    );
    println!("   Proving key: {}", config.layout().zkey_final(&circuit).display());
    println!("   Verification key: {}", config.layout().verification_key().display());
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    report("Phase 2 setup failed", run(cli))
}
