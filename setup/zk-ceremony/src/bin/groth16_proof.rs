use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use zk_ceremony::cli::{init_logging, parse_args, report, WorkspaceArgs};
use zk_ceremony::proof::{export_calldata, generate_proof, verify_proof};
use zk_ceremony::{CeremonyError, CircuitName, Snarkjs};

/// Proves, verifies and formats Groth16 proofs against a finished ceremony's keys.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    workspace: WorkspaceArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the witness and a proof from a JSON input file
    Prove {
        circuit_name: String,
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Check proof.json and public.json against verification_key.json
    Verify,
    /// Print verifyProof(a, b, c, input) arguments as JSON
    Calldata,
}

// cargo run --release --bin groth16_proof -- prove KnowFactorsOf33 --input input.json
// cargo run --release --bin groth16_proof -- verify

fn run(cli: Cli) -> zk_ceremony::Result<()> {
    let config = cli.workspace.into_config()?;
    let layout = config.layout();
    let mut toolchain = Snarkjs::new(&config.snarkjs, config.verbose);

    match cli.command {
        Command::Prove {
            circuit_name,
            input,
        } => {
            let circuit = CircuitName::parse(&circuit_name)?;
            let artifacts = generate_proof(&mut toolchain, &layout, &circuit, &input)?;
            println!("✅ Proof saved to: {}", artifacts.proof_path.display());
            println!("✅ Public signals saved to: {}", artifacts.public_path.display());
            println!("   Public signals: {}", artifacts.public_signals);
        }
        Command::Verify => {
            let valid = verify_proof(
                &mut toolchain,
                &layout.verification_key(),
                &layout.public_signals(),
                &layout.proof(),
            )?;
            if !valid {
                return Err(CeremonyError::DelegatedProcessFailure {
                    step: "groth16 verify".to_string(),
                    message: "proof is invalid".to_string(),
                });
            }
            println!("✅ Proof is valid");
        }
        Command::Calldata => {
            let calldata =
                export_calldata(&mut toolchain, &layout.public_signals(), &layout.proof())?;
            println!("{}", serde_json::to_string_pretty(&calldata)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    report("Proof command failed", run(cli))
}
