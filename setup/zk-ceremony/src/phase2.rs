//! Circuit-specific setup: turns the final powers of tau and a compiled circuit into a
//! Groth16 proving key and its verification key.

use crate::artifacts::{CircuitName, EXTERNAL_ROUND};
use crate::config::CeremonyConfig;
use crate::entropy::EntropySource;
use crate::errors::Result;
use crate::steps::{Plan, Requirement, RunReport, Runner, Step};
use crate::toolchain::{Operation, Toolchain};
use crate::transcript::CeremonyTranscript;

pub const PHASE2_TITLE: &str = "Phase 2 (Circuit-specific)";

pub const DEV_CONTRIBUTOR: &str = "Dev Contributor";
pub const SECOND_CONTRIBUTION: &str = "Second contribution Name";
pub const THIRD_CONTRIBUTION: &str = "Third contribution name";
pub const PHASE2_BEACON: &str = "Final Beacon phase2";

pub const RUN_PHASE1_FIRST: &str = "Run Phase 1 first.";
pub const COMPILE_CIRCUIT_FIRST: &str = "Compile your circuit first.";

pub struct Phase2Orchestrator<'a> {
    config: &'a CeremonyConfig,
    circuit: &'a CircuitName,
}

impl<'a> Phase2Orchestrator<'a> {
    pub fn new(config: &'a CeremonyConfig, circuit: &'a CircuitName) -> Self {
        Self { config, circuit }
    }

    pub fn requirements(&self) -> Vec<Requirement> {
        let layout = self.config.layout();
        vec![
            Requirement::new(layout.ptau_final(), RUN_PHASE1_FIRST),
            Requirement::new(layout.r1cs(self.circuit), COMPILE_CIRCUIT_FIRST),
        ]
    }

    pub fn check_preconditions(&self) -> Result<()> {
        self.requirements().iter().try_for_each(Requirement::check)
    }

    pub fn plan(&self) -> Plan {
        let layout = self.config.layout();
        let circuit = self.circuit;
        let curve = self.config.curve;
        let external = EXTERNAL_ROUND;
        let r1cs = layout.r1cs(circuit);
        let ptau = layout.ptau_final();

        let mut plan = Plan::new(PHASE2_TITLE);
        for requirement in self.requirements() {
            plan = plan.require(requirement);
        }

        plan.step(Step::new(
            "Generate the initial zkey",
            Operation::Groth16Setup {
                r1cs: r1cs.clone(),
                ptau: ptau.clone(),
                output: layout.zkey(circuit, 0),
            },
        ))
        .step(Step::new(
            "First zkey contribution",
            Operation::ZkeyContribute {
                input: layout.zkey(circuit, 0),
                output: layout.zkey(circuit, 1),
                name: DEV_CONTRIBUTOR.to_string(),
            },
        ))
        .step(Step::new(
            "Second zkey contribution",
            Operation::ZkeyContribute {
                input: layout.zkey(circuit, 1),
                output: layout.zkey(circuit, 2),
                name: SECOND_CONTRIBUTION.to_string(),
            },
        ))
        .step(Step::new(
            "Export bellman challenge",
            Operation::ZkeyExportBellman {
                input: layout.zkey(circuit, external - 1),
                challenge: layout.phase2_challenge(external),
            },
        ))
        .step(Step::new(
            "Contribute to bellman challenge",
            Operation::ZkeyBellmanContribute {
                curve,
                challenge: layout.phase2_challenge(external),
                response: layout.phase2_response(external),
            },
        ))
        .step(Step::new(
            "Import bellman response",
            Operation::ZkeyImportBellman {
                previous: layout.zkey(circuit, external - 1),
                response: layout.phase2_response(external),
                output: layout.zkey(circuit, external),
                name: THIRD_CONTRIBUTION.to_string(),
            },
        ))
        .step(Step::new(
            "Verify the latest zkey",
            Operation::ZkeyVerify {
                r1cs: r1cs.clone(),
                ptau: ptau.clone(),
                zkey: layout.zkey(circuit, external),
            },
        ))
        .step(
            Step::new(
                "Apply random beacon",
                Operation::ZkeyBeacon {
                    input: layout.zkey(circuit, external),
                    output: layout.zkey_final(circuit),
                    beacon: self.config.beacon.clone(),
                    name: PHASE2_BEACON.to_string(),
                },
            )
            .after_verifying(layout.zkey(circuit, external)),
        )
        .step(Step::new(
            "Verify the final zkey",
            Operation::ZkeyVerify {
                r1cs,
                ptau,
                zkey: layout.zkey_final(circuit),
            },
        ))
        .step(
            Step::new(
                "Export the verification key",
                Operation::ZkeyExportVerificationKey {
                    zkey: layout.zkey_final(circuit),
                    output: layout.verification_key(),
                },
            )
            .after_verifying(layout.zkey_final(circuit)),
        )
    }

    pub fn run(
        &self,
        toolchain: &mut dyn Toolchain,
        entropy: &mut dyn EntropySource,
    ) -> Result<RunReport> {
        let layout = self.config.layout();
        self.check_preconditions()?;

        println!("🔑 Running circuit-specific setup for {}...", self.circuit);
        let report = Runner::new(toolchain, entropy).run(&self.plan())?;

        let transcript_path = layout.phase2_transcript(self.circuit);
        CeremonyTranscript::new(&report.title, report.records.clone())
            .write_into_json(&transcript_path)?;
        println!(
            "   📄 Phase 2 transcript saved to: {}",
            transcript_path.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CeremonyError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn circuit() -> CircuitName {
        CircuitName::parse("KnowFactorsOf33").unwrap()
    }

    #[test]
    fn test_plan_produces_chain_in_order() {
        let config = CeremonyConfig::default();
        let circuit = circuit();
        let plan = Phase2Orchestrator::new(&config, &circuit).plan();

        assert_eq!(plan.requirements.len(), 2);
        assert_eq!(plan.steps.len(), 10);
        let expected: Vec<PathBuf> = [
            "KnowFactorsOf33_0000.zkey",
            "KnowFactorsOf33_0001.zkey",
            "KnowFactorsOf33_0002.zkey",
            "challenge_phase2_0003",
            "response_phase2_0003",
            "KnowFactorsOf33_0003.zkey",
            "KnowFactorsOf33_final.zkey",
            "verification_key.json",
        ]
        .iter()
        .map(|name| Path::new("build").join(name))
        .collect();
        let outputs: Vec<PathBuf> = plan.outputs().into_iter().map(Path::to_path_buf).collect();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn test_verifications_gate_beacon_and_export() {
        let config = CeremonyConfig::default();
        let circuit = circuit();
        let layout = config.layout();
        let plan = Phase2Orchestrator::new(&config, &circuit).plan();

        assert_eq!(plan.steps[7].requires_verified, vec![layout.zkey(&circuit, 3)]);
        assert_eq!(plan.steps[9].requires_verified, vec![layout.zkey_final(&circuit)]);
        assert_eq!(
            plan.steps[8].operation.verifies(),
            Some(layout.zkey_final(&circuit).as_path())
        );
    }

    #[test]
    fn test_preconditions() {
        let dir = tempdir().unwrap();
        let config = CeremonyConfig {
            workspace_dir: dir.path().to_path_buf(),
            ..CeremonyConfig::default()
        };
        let circuit = circuit();
        let orchestrator = Phase2Orchestrator::new(&config, &circuit);

        let err = orchestrator.check_preconditions().unwrap_err();
        assert!(matches!(
            err,
            CeremonyError::PreconditionMissing { ref remedy, .. } if remedy == RUN_PHASE1_FIRST
        ));

        fs::write(config.layout().ptau_final(), b"ptau").unwrap();
        let err = orchestrator.check_preconditions().unwrap_err();
        assert!(matches!(
            err,
            CeremonyError::PreconditionMissing { ref remedy, .. } if remedy == COMPILE_CIRCUIT_FIRST
        ));

        fs::write(config.layout().r1cs(&circuit), b"r1cs").unwrap();
        assert!(orchestrator.check_preconditions().is_ok());
    }
}
