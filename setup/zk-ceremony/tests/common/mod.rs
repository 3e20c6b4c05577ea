#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zk_ceremony::{CeremonyConfig, CircuitName, Execution, Operation, Result, Toolchain};

pub const CIRCUIT: &str = "KnowFactorsOf33";

/// Stands in for snarkjs: records every call and writes each declared output.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    pub calls: Vec<Operation>,
    pub entropies: Vec<Option<String>>,
    fail_on: Option<String>,
    calldata: Option<String>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every invocation of `command` exits with status 1 and writes nothing.
    pub fn failing(command: &str) -> Self {
        Self {
            fail_on: Some(command.to_string()),
            ..Self::default()
        }
    }

    pub fn with_calldata(calldata: &str) -> Self {
        Self {
            calldata: Some(calldata.to_string()),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.calls.iter().map(Operation::command).collect()
    }

    /// Outputs in the order they were produced.
    pub fn produced(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .flat_map(|op| op.outputs().into_iter().map(Path::to_path_buf))
            .collect()
    }
}

impl Toolchain for FakeToolchain {
    fn execute(&mut self, operation: &Operation, entropy: Option<&str>) -> Result<Execution> {
        self.calls.push(operation.clone());
        self.entropies.push(entropy.map(str::to_string));

        if self.fail_on.as_deref() == Some(operation.command()) {
            return Ok(Execution::failed(1));
        }
        for (i, output) in operation.outputs().into_iter().enumerate() {
            let body = match operation {
                Operation::Groth16FullProve { .. } if i == 0 => {
                    r#"{"protocol":"groth16"}"#.to_string()
                }
                Operation::Groth16FullProve { .. } => r#"["33"]"#.to_string(),
                _ => format!("{} #{}", operation.command(), self.calls.len()),
            };
            fs::write(output, body).expect("fake toolchain cannot write output");
        }
        Ok(Execution {
            stdout: self.calldata.clone(),
            ..Execution::succeeded()
        })
    }
}

/// A workspace in a temp dir with the compiled circuit already in place.
pub struct Workspace {
    pub root: TempDir,
    pub config: CeremonyConfig,
    pub circuit: CircuitName,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("cannot create temp dir");
        let config = CeremonyConfig {
            workspace_dir: root.path().join("build"),
            public_circuits_dir: root.path().join("public").join("circuits"),
            ..CeremonyConfig::default()
        };
        fs::create_dir_all(&config.workspace_dir).expect("cannot create workspace");
        let circuit = CircuitName::parse(CIRCUIT).expect("valid circuit name");
        Self {
            root,
            config,
            circuit,
        }
    }

    pub fn with_r1cs() -> Self {
        let workspace = Self::new();
        fs::write(workspace.config.layout().r1cs(&workspace.circuit), b"r1cs")
            .expect("cannot write r1cs");
        workspace
    }

    pub fn build_dir(&self) -> &Path {
        &self.config.workspace_dir
    }
}
