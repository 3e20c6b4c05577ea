//! Typed view of the external zk-SNARK toolchain.
//!
//! Every command the ceremony delegates is an [`Operation`] carrying the paths it reads and
//! writes. The orchestrator only ever talks to a [`Toolchain`]; [`Snarkjs`] is the production
//! implementation that shells out to the `snarkjs` CLI.

use crate::errors::{CeremonyError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_BEACON_HASH: &str =
    "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
pub const DEFAULT_BEACON_ITERATIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Curve {
    #[serde(rename = "bn128")]
    Bn128,
    #[serde(rename = "bls12-381")]
    Bls12_381,
}

impl Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::Bn128 => "bn128",
            Curve::Bls12_381 => "bls12-381",
        }
    }
}

/// Public randomness applied as the last contribution of a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Beacon {
    /// Hex-encoded beacon value
    pub hash: String,
    /// The beacon hash is iterated 2^iterations times
    pub iterations: u32,
}

impl Default for Beacon {
    fn default() -> Self {
        Self {
            hash: DEFAULT_BEACON_HASH.to_string(),
            iterations: DEFAULT_BEACON_ITERATIONS,
        }
    }
}

/// One delegated toolchain command.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    PtauNew {
        curve: Curve,
        power: u32,
        output: PathBuf,
    },
    PtauContribute {
        input: PathBuf,
        output: PathBuf,
        name: String,
    },
    PtauExportChallenge {
        input: PathBuf,
        challenge: PathBuf,
    },
    PtauChallengeContribute {
        curve: Curve,
        challenge: PathBuf,
        response: PathBuf,
    },
    PtauImportResponse {
        previous: PathBuf,
        response: PathBuf,
        output: PathBuf,
        name: String,
    },
    PtauVerify {
        ptau: PathBuf,
        /// Only honoured when the driver itself is verbose.
        verbose: bool,
    },
    PtauBeacon {
        input: PathBuf,
        output: PathBuf,
        beacon: Beacon,
        name: String,
    },
    PtauPreparePhase2 {
        input: PathBuf,
        output: PathBuf,
    },
    Groth16Setup {
        r1cs: PathBuf,
        ptau: PathBuf,
        output: PathBuf,
    },
    ZkeyContribute {
        input: PathBuf,
        output: PathBuf,
        name: String,
    },
    ZkeyExportBellman {
        input: PathBuf,
        challenge: PathBuf,
    },
    ZkeyBellmanContribute {
        curve: Curve,
        challenge: PathBuf,
        response: PathBuf,
    },
    ZkeyImportBellman {
        previous: PathBuf,
        response: PathBuf,
        output: PathBuf,
        name: String,
    },
    ZkeyVerify {
        r1cs: PathBuf,
        ptau: PathBuf,
        zkey: PathBuf,
    },
    ZkeyBeacon {
        input: PathBuf,
        output: PathBuf,
        beacon: Beacon,
        name: String,
    },
    ZkeyExportVerificationKey {
        zkey: PathBuf,
        output: PathBuf,
    },
    Groth16FullProve {
        input: PathBuf,
        wasm: PathBuf,
        zkey: PathBuf,
        proof: PathBuf,
        public: PathBuf,
    },
    Groth16Verify {
        verification_key: PathBuf,
        public: PathBuf,
        proof: PathBuf,
    },
    ExportSolidityCalldata {
        public: PathBuf,
        proof: PathBuf,
    },
}

/// A step that moves a contribution chain forward by one artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainLink<'a> {
    pub previous: &'a Path,
    pub artifact: &'a Path,
    pub name: &'a str,
}

impl Operation {
    /// Toolchain subcommand, used in diagnostics.
    pub fn command(&self) -> &'static str {
        match self {
            Operation::PtauNew { .. } => "powersoftau new",
            Operation::PtauContribute { .. } => "powersoftau contribute",
            Operation::PtauExportChallenge { .. } => "powersoftau export challenge",
            Operation::PtauChallengeContribute { .. } => "powersoftau challenge contribute",
            Operation::PtauImportResponse { .. } => "powersoftau import response",
            Operation::PtauVerify { .. } => "powersoftau verify",
            Operation::PtauBeacon { .. } => "powersoftau beacon",
            Operation::PtauPreparePhase2 { .. } => "powersoftau prepare phase2",
            Operation::Groth16Setup { .. } => "groth16 setup",
            Operation::ZkeyContribute { .. } => "zkey contribute",
            Operation::ZkeyExportBellman { .. } => "zkey export bellman",
            Operation::ZkeyBellmanContribute { .. } => "zkey bellman contribute",
            Operation::ZkeyImportBellman { .. } => "zkey import bellman",
            Operation::ZkeyVerify { .. } => "zkey verify",
            Operation::ZkeyBeacon { .. } => "zkey beacon",
            Operation::ZkeyExportVerificationKey { .. } => "zkey export verificationkey",
            Operation::Groth16FullProve { .. } => "groth16 fullprove",
            Operation::Groth16Verify { .. } => "groth16 verify",
            Operation::ExportSolidityCalldata { .. } => "zkey export soliditycalldata",
        }
    }

    /// Artifacts that must exist before the command runs.
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            Operation::PtauNew { .. } => vec![],
            Operation::PtauContribute { input, .. }
            | Operation::PtauExportChallenge { input, .. }
            | Operation::PtauBeacon { input, .. }
            | Operation::PtauPreparePhase2 { input, .. }
            | Operation::ZkeyContribute { input, .. }
            | Operation::ZkeyExportBellman { input, .. }
            | Operation::ZkeyBeacon { input, .. } => vec![input.as_path()],
            Operation::PtauChallengeContribute { challenge, .. }
            | Operation::ZkeyBellmanContribute { challenge, .. } => vec![challenge.as_path()],
            Operation::PtauImportResponse { previous, response, .. }
            | Operation::ZkeyImportBellman { previous, response, .. } => {
                vec![previous.as_path(), response.as_path()]
            }
            Operation::PtauVerify { ptau, .. } => vec![ptau.as_path()],
            Operation::Groth16Setup { r1cs, ptau, .. } => vec![r1cs.as_path(), ptau.as_path()],
            Operation::ZkeyVerify { r1cs, ptau, zkey } => {
                vec![r1cs.as_path(), ptau.as_path(), zkey.as_path()]
            }
            Operation::ZkeyExportVerificationKey { zkey, .. } => vec![zkey.as_path()],
            Operation::Groth16FullProve { input, wasm, zkey, .. } => {
                vec![input.as_path(), wasm.as_path(), zkey.as_path()]
            }
            Operation::Groth16Verify { verification_key, public, proof } => {
                vec![verification_key.as_path(), public.as_path(), proof.as_path()]
            }
            Operation::ExportSolidityCalldata { public, proof } => {
                vec![public.as_path(), proof.as_path()]
            }
        }
    }

    /// Artifacts the command is expected to create.
    pub fn outputs(&self) -> Vec<&Path> {
        match self {
            Operation::PtauNew { output, .. }
            | Operation::PtauContribute { output, .. }
            | Operation::PtauImportResponse { output, .. }
            | Operation::PtauBeacon { output, .. }
            | Operation::PtauPreparePhase2 { output, .. }
            | Operation::Groth16Setup { output, .. }
            | Operation::ZkeyContribute { output, .. }
            | Operation::ZkeyImportBellman { output, .. }
            | Operation::ZkeyBeacon { output, .. }
            | Operation::ZkeyExportVerificationKey { output, .. } => vec![output.as_path()],
            Operation::PtauExportChallenge { challenge, .. }
            | Operation::ZkeyExportBellman { challenge, .. } => vec![challenge.as_path()],
            Operation::PtauChallengeContribute { response, .. }
            | Operation::ZkeyBellmanContribute { response, .. } => vec![response.as_path()],
            Operation::Groth16FullProve { proof, public, .. } => {
                vec![proof.as_path(), public.as_path()]
            }
            Operation::PtauVerify { .. }
            | Operation::ZkeyVerify { .. }
            | Operation::Groth16Verify { .. }
            | Operation::ExportSolidityCalldata { .. } => vec![],
        }
    }

    pub fn takes_entropy(&self) -> bool {
        matches!(
            self,
            Operation::PtauContribute { .. }
                | Operation::PtauChallengeContribute { .. }
                | Operation::ZkeyContribute { .. }
                | Operation::ZkeyBellmanContribute { .. }
        )
    }

    /// The chain artifact a successful run of this command vouches for.
    pub fn verifies(&self) -> Option<&Path> {
        match self {
            Operation::PtauVerify { ptau, .. } => Some(ptau.as_path()),
            Operation::ZkeyVerify { zkey, .. } => Some(zkey.as_path()),
            _ => None,
        }
    }

    pub fn chain_link(&self) -> Option<ChainLink<'_>> {
        match self {
            Operation::PtauContribute { input, output, name }
            | Operation::PtauBeacon { input, output, name, .. }
            | Operation::ZkeyContribute { input, output, name }
            | Operation::ZkeyBeacon { input, output, name, .. } => Some(ChainLink {
                previous: input,
                artifact: output,
                name,
            }),
            Operation::PtauImportResponse { previous, output, name, .. }
            | Operation::ZkeyImportBellman { previous, output, name, .. } => Some(ChainLink {
                previous,
                artifact: output,
                name,
            }),
            _ => None,
        }
    }

    pub fn captures_stdout(&self) -> bool {
        matches!(self, Operation::ExportSolidityCalldata { .. })
    }
}

/// Outcome of a delegated command that could be launched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Option<String>,
}

impl Execution {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: None,
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: None,
        }
    }

    /// Operator-facing reason for a non-success exit.
    pub fn failure_message(&self, command: &str) -> String {
        match self.code {
            Some(code) => format!("{} exited with status {}", command, code),
            None => format!("{} was terminated by a signal", command),
        }
    }
}

pub trait Toolchain {
    /// Runs `operation` to completion. `Err` means the command could not be launched at all;
    /// a command that ran and failed is reported through [`Execution::success`].
    fn execute(&mut self, operation: &Operation, entropy: Option<&str>) -> Result<Execution>;
}

/// `snarkjs` command-line driver.
#[derive(Debug, Clone)]
pub struct Snarkjs {
    program: PathBuf,
    verbose: bool,
}

impl Snarkjs {
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    pub fn args(&self, operation: &Operation, entropy: Option<&str>) -> Vec<OsString> {
        let mut args = Args::default();
        match operation {
            Operation::PtauNew { curve, power, output } => {
                args.words(&["powersoftau", "new", curve.as_str()]);
                args.word(power.to_string());
                args.path(output);
                args.verbose(self.verbose);
            }
            Operation::PtauContribute { input, output, name } => {
                args.words(&["powersoftau", "contribute"]);
                args.path(input).path(output);
                args.word(format!("--name={}", name));
                args.verbose(self.verbose);
                args.entropy(entropy);
            }
            Operation::PtauExportChallenge { input, challenge } => {
                args.words(&["powersoftau", "export", "challenge"]);
                args.path(input).path(challenge);
            }
            Operation::PtauChallengeContribute { curve, challenge, response } => {
                args.words(&["powersoftau", "challenge", "contribute", curve.as_str()]);
                args.path(challenge).path(response);
                args.entropy(entropy);
            }
            Operation::PtauImportResponse { previous, response, output, name } => {
                args.words(&["powersoftau", "import", "response"]);
                args.path(previous).path(response).path(output);
                args.word(format!("-n={}", name));
            }
            Operation::PtauVerify { ptau, verbose } => {
                args.words(&["powersoftau", "verify"]);
                args.path(ptau);
                args.verbose(self.verbose && *verbose);
            }
            Operation::PtauBeacon { input, output, beacon, name } => {
                args.words(&["powersoftau", "beacon"]);
                args.path(input).path(output);
                args.word(beacon.hash.clone());
                args.word(beacon.iterations.to_string());
                args.word(format!("-n={}", name));
            }
            Operation::PtauPreparePhase2 { input, output } => {
                args.words(&["powersoftau", "prepare", "phase2"]);
                args.path(input).path(output);
                args.verbose(self.verbose);
            }
            Operation::Groth16Setup { r1cs, ptau, output } => {
                args.words(&["groth16", "setup"]);
                args.path(r1cs).path(ptau).path(output);
            }
            Operation::ZkeyContribute { input, output, name } => {
                args.words(&["zkey", "contribute"]);
                args.path(input).path(output);
                args.word(format!("--name={}", name));
                args.verbose(self.verbose);
                args.entropy(entropy);
            }
            Operation::ZkeyExportBellman { input, challenge } => {
                args.words(&["zkey", "export", "bellman"]);
                args.path(input).path(challenge);
            }
            Operation::ZkeyBellmanContribute { curve, challenge, response } => {
                args.words(&["zkey", "bellman", "contribute", curve.as_str()]);
                args.path(challenge).path(response);
                args.entropy(entropy);
            }
            Operation::ZkeyImportBellman { previous, response, output, name } => {
                args.words(&["zkey", "import", "bellman"]);
                args.path(previous).path(response).path(output);
                args.word(format!("-n={}", name));
            }
            Operation::ZkeyVerify { r1cs, ptau, zkey } => {
                args.words(&["zkey", "verify"]);
                args.path(r1cs).path(ptau).path(zkey);
            }
            Operation::ZkeyBeacon { input, output, beacon, name } => {
                args.words(&["zkey", "beacon"]);
                args.path(input).path(output);
                args.word(beacon.hash.clone());
                args.word(beacon.iterations.to_string());
                args.word(format!("-n={}", name));
            }
            Operation::ZkeyExportVerificationKey { zkey, output } => {
                args.words(&["zkey", "export", "verificationkey"]);
                args.path(zkey).path(output);
            }
            Operation::Groth16FullProve { input, wasm, zkey, proof, public } => {
                args.words(&["groth16", "fullprove"]);
                args.path(input).path(wasm).path(zkey).path(proof).path(public);
            }
            Operation::Groth16Verify { verification_key, public, proof } => {
                args.words(&["groth16", "verify"]);
                args.path(verification_key).path(public).path(proof);
            }
            Operation::ExportSolidityCalldata { public, proof } => {
                args.words(&["zkey", "export", "soliditycalldata"]);
                args.path(public).path(proof);
            }
        }
        args.0
    }
}

impl Toolchain for Snarkjs {
    fn execute(&mut self, operation: &Operation, entropy: Option<&str>) -> Result<Execution> {
        let args = self.args(operation, entropy);
        debug!(
            "running {} {}",
            self.program.display(),
            redact_entropy(&args).join(" ")
        );

        let mut command = Command::new(&self.program);
        command.args(&args);
        let launch_error = |e: std::io::Error| CeremonyError::DelegatedProcessFailure {
            step: operation.command().to_string(),
            message: format!("cannot launch {}: {}", self.program.display(), e),
        };

        if operation.captures_stdout() {
            let output = command
                .stdin(Stdio::null())
                .stderr(Stdio::inherit())
                .output()
                .map_err(launch_error)?;
            Ok(Execution {
                success: output.status.success(),
                code: output.status.code(),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            })
        } else {
            let status = command.status().map_err(launch_error)?;
            Ok(Execution {
                success: status.success(),
                code: status.code(),
                stdout: None,
            })
        }
    }
}

#[derive(Default)]
struct Args(Vec<OsString>);

impl Args {
    fn word(&mut self, word: impl Into<OsString>) -> &mut Self {
        self.0.push(word.into());
        self
    }

    fn words(&mut self, words: &[&str]) -> &mut Self {
        self.0.extend(words.iter().map(OsString::from));
        self
    }

    fn path(&mut self, path: &Path) -> &mut Self {
        self.0.push(path.as_os_str().to_owned());
        self
    }

    fn verbose(&mut self, verbose: bool) -> &mut Self {
        if verbose {
            self.0.push("-v".into());
        }
        self
    }

    fn entropy(&mut self, entropy: Option<&str>) -> &mut Self {
        if let Some(entropy) = entropy {
            self.0.push(format!("-e={}", entropy).into());
        }
        self
    }
}

// Contributor entropy must never reach the logs.
fn redact_entropy(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.starts_with("-e=") {
                "-e=<redacted>".to_string()
            } else {
                arg.into_owned()
            }
        })
        .collect()
}
