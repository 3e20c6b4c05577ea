//! Universal setup: the circuit-independent powers-of-tau ceremony.

use crate::artifacts::EXTERNAL_ROUND;
use crate::config::CeremonyConfig;
use crate::entropy::EntropySource;
use crate::errors::{CeremonyError, Result};
use crate::steps::{Plan, RunReport, Runner, Step};
use crate::toolchain::{Operation, Toolchain};
use crate::transcript::CeremonyTranscript;
use std::fs;

pub const PHASE1_TITLE: &str = "Phase 1 (Powers of Tau)";

pub const FIRST_CONTRIBUTION: &str = "First contribution";
pub const SECOND_CONTRIBUTION: &str = "Second contribution";
pub const THIRD_PARTY_CONTRIBUTION: &str = "Third-party contribution";
pub const PHASE1_BEACON: &str = "Final Beacon";

pub struct Phase1Orchestrator<'a> {
    config: &'a CeremonyConfig,
}

impl<'a> Phase1Orchestrator<'a> {
    pub fn new(config: &'a CeremonyConfig) -> Self {
        Self { config }
    }

    pub fn plan(&self) -> Plan {
        let layout = self.config.layout();
        let curve = self.config.curve;
        let external = EXTERNAL_ROUND;

        Plan::new(PHASE1_TITLE)
            .step(Step::new(
                "Start a new powers of tau ceremony",
                Operation::PtauNew {
                    curve,
                    power: self.config.power,
                    output: layout.ptau(0),
                },
            ))
            .step(Step::new(
                "First contribution",
                Operation::PtauContribute {
                    input: layout.ptau(0),
                    output: layout.ptau(1),
                    name: FIRST_CONTRIBUTION.to_string(),
                },
            ))
            .step(Step::new(
                "Second contribution",
                Operation::PtauContribute {
                    input: layout.ptau(1),
                    output: layout.ptau(2),
                    name: SECOND_CONTRIBUTION.to_string(),
                },
            ))
            .step(Step::new(
                "Export challenge for third-party contribution",
                Operation::PtauExportChallenge {
                    input: layout.ptau(external - 1),
                    challenge: layout.challenge(external),
                },
            ))
            .step(Step::new(
                "Contribute to challenge",
                Operation::PtauChallengeContribute {
                    curve,
                    challenge: layout.challenge(external),
                    response: layout.response(external),
                },
            ))
            .step(Step::new(
                "Import third-party response",
                Operation::PtauImportResponse {
                    previous: layout.ptau(external - 1),
                    response: layout.response(external),
                    output: layout.ptau(external),
                    name: THIRD_PARTY_CONTRIBUTION.to_string(),
                },
            ))
            .step(Step::new(
                "Verify the protocol so far",
                Operation::PtauVerify {
                    ptau: layout.ptau(external),
                    verbose: false,
                },
            ))
            .step(
                Step::new(
                    "Apply random beacon",
                    Operation::PtauBeacon {
                        input: layout.ptau(external),
                        output: layout.ptau_beacon(),
                        beacon: self.config.beacon.clone(),
                        name: PHASE1_BEACON.to_string(),
                    },
                )
                .after_verifying(layout.ptau(external)),
            )
            .step(Step::new(
                "Prepare phase 2",
                Operation::PtauPreparePhase2 {
                    input: layout.ptau_beacon(),
                    output: layout.ptau_final(),
                },
            ))
            .step(Step::new(
                "Verify the final ptau",
                Operation::PtauVerify {
                    ptau: layout.ptau_final(),
                    verbose: true,
                },
            ))
    }

    /// Runs the whole universal setup from `0000`, replacing any earlier chain.
    pub fn run(
        &self,
        toolchain: &mut dyn Toolchain,
        entropy: &mut dyn EntropySource,
    ) -> Result<RunReport> {
        let layout = self.config.layout();
        fs::create_dir_all(layout.dir()).map_err(|e| CeremonyError::fs(layout.dir(), e))?;

        println!(
            "⚡ Generating local powers of tau ({}, power {})...",
            self.config.curve.as_str(),
            self.config.power
        );
        let report = Runner::new(toolchain, entropy).run(&self.plan())?;

        CeremonyTranscript::new(&report.title, report.records.clone())
            .write_into_json(layout.phase1_transcript())?;
        println!(
            "   📄 Phase 1 transcript saved to: {}",
            layout.phase1_transcript().display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::Snarkjs;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_plan_produces_chain_in_order() {
        let config = CeremonyConfig::default();
        let plan = Phase1Orchestrator::new(&config).plan();

        assert!(plan.requirements.is_empty());
        assert_eq!(plan.steps.len(), 10);
        let expected: Vec<PathBuf> = [
            "pot12_0000.ptau",
            "pot12_0001.ptau",
            "pot12_0002.ptau",
            "challenge_0003",
            "response_0003",
            "pot12_0003.ptau",
            "pot12_beacon.ptau",
            "pot12_final.ptau",
        ]
        .iter()
        .map(|name| Path::new("build").join(name))
        .collect();
        let outputs: Vec<PathBuf> = plan.outputs().into_iter().map(Path::to_path_buf).collect();
        assert_eq!(outputs, expected);
    }

    #[test]
    fn test_beacon_follows_verification() {
        let config = CeremonyConfig::default();
        let plan = Phase1Orchestrator::new(&config).plan();
        let layout = config.layout();

        let verify = &plan.steps[6];
        let beacon = &plan.steps[7];
        assert_eq!(verify.operation.verifies(), Some(layout.ptau(3).as_path()));
        assert_eq!(beacon.requires_verified, vec![layout.ptau(3)]);
        assert!(matches!(
            &beacon.operation,
            Operation::PtauBeacon { beacon, .. } if *beacon == config.beacon
        ));
    }

    #[test]
    fn test_entropy_is_requested_for_each_contribution() {
        let config = CeremonyConfig::default();
        let plan = Phase1Orchestrator::new(&config).plan();
        let takes: Vec<bool> = plan
            .steps
            .iter()
            .map(|s| s.operation.takes_entropy())
            .collect();
        assert_eq!(
            takes,
            vec![false, true, true, false, true, false, false, false, false, false]
        );
    }

    #[test]
    fn test_only_final_verification_is_verbose() {
        let config = CeremonyConfig::default();
        let plan = Phase1Orchestrator::new(&config).plan();
        let snarkjs = Snarkjs::new("snarkjs", true);
        let argv = |i: usize| -> Vec<String> {
            snarkjs
                .args(&plan.steps[i].operation, None)
                .into_iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect()
        };

        assert_eq!(argv(6), vec!["powersoftau", "verify", "build/pot12_0003.ptau"]);
        assert_eq!(
            argv(9),
            vec!["powersoftau", "verify", "build/pot12_final.ptau", "-v"]
        );
        assert_eq!(
            argv(8),
            vec![
                "powersoftau",
                "prepare",
                "phase2",
                "build/pot12_beacon.ptau",
                "build/pot12_final.ptau",
                "-v"
            ]
        );

        let quiet = Snarkjs::new("snarkjs", false);
        let final_verify = quiet.args(&plan.steps[9].operation, None);
        assert!(!final_verify.iter().any(|a| a.to_str() == Some("-v")));
    }
}
