//! Step table and the linear runner that executes it.
//!
//! A [`Plan`] is an ordered list of [`Step`]s. The [`Runner`] executes them one at a time and
//! stops at the first failure. Before a step runs, its inputs must exist and every artifact
//! listed in `requires_verified` must have been vouched for by a verify step earlier in the
//! same run; after it runs, every declared output must exist.

use crate::entropy::EntropySource;
use crate::errors::{CeremonyError, Result};
use crate::toolchain::{Operation, Toolchain};
use crate::transcript::{blake2b_file, ContributionRecord};
use chrono::Local;
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub operation: Operation,
    pub requires_verified: Vec<PathBuf>,
}

impl Step {
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            operation,
            requires_verified: Vec::new(),
        }
    }

    pub fn after_verifying(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.requires_verified.push(artifact.into());
        self
    }
}

/// An artifact the plan consumes but does not produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub artifact: PathBuf,
    pub remedy: String,
}

impl Requirement {
    pub fn new(artifact: impl Into<PathBuf>, remedy: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            remedy: remedy.into(),
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.artifact.exists() {
            Ok(())
        } else {
            Err(CeremonyError::PreconditionMissing {
                artifact: self.artifact.clone(),
                remedy: self.remedy.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub title: String,
    pub requirements: Vec<Requirement>,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            requirements: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn require(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn check_requirements(&self) -> Result<()> {
        self.requirements.iter().try_for_each(Requirement::check)
    }

    /// Every artifact the plan writes, in step order.
    pub fn outputs(&self) -> Vec<&Path> {
        self.steps
            .iter()
            .flat_map(|step| step.operation.outputs())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub title: String,
    pub completed: Vec<String>,
    pub records: Vec<ContributionRecord>,
    pub elapsed: Duration,
}

pub struct Runner<'a> {
    toolchain: &'a mut dyn Toolchain,
    entropy: &'a mut dyn EntropySource,
    verified: HashSet<PathBuf>,
}

impl<'a> Runner<'a> {
    pub fn new(toolchain: &'a mut dyn Toolchain, entropy: &'a mut dyn EntropySource) -> Self {
        Self {
            toolchain,
            entropy,
            verified: HashSet::new(),
        }
    }

    pub fn run(&mut self, plan: &Plan) -> Result<RunReport> {
        let start = Instant::now();
        plan.check_requirements()?;

        let total = plan.steps.len();
        let mut completed = Vec::with_capacity(total);
        let mut records = Vec::new();

        for (i, step) in plan.steps.iter().enumerate() {
            println!("⚡ [{}/{}] {}", i + 1, total, step.name);
            let step_start = Instant::now();

            if let Some(record) = self.run_step(plan, step, records.len() as u32 + 1)? {
                records.push(record);
            }

            let lap = step_start.elapsed();
            println!("   ✅ {} completed in {:.3} seconds", step.name, lap.as_secs_f64());
            completed.push(step.name.clone());
        }

        let elapsed = start.elapsed();
        info!("{}: {} steps in {:?}", plan.title, total, elapsed);
        Ok(RunReport {
            title: plan.title.clone(),
            completed,
            records,
            elapsed,
        })
    }

    fn run_step(
        &mut self,
        plan: &Plan,
        step: &Step,
        contributor_no: u32,
    ) -> Result<Option<ContributionRecord>> {
        let started = Instant::now();

        for input in step.operation.inputs() {
            if !input.exists() {
                return Err(CeremonyError::PreconditionMissing {
                    artifact: input.to_path_buf(),
                    remedy: format!("'{}' needs it as input.", step.name),
                });
            }
        }
        for artifact in &step.requires_verified {
            if !self.verified.contains(artifact) {
                return Err(CeremonyError::UnverifiedPredecessor {
                    step: step.name.clone(),
                    artifact: artifact.clone(),
                });
            }
        }

        let entropy = if step.operation.takes_entropy() {
            Some(self.entropy.next_entropy()?)
        } else {
            None
        };

        let execution = self.toolchain.execute(&step.operation, entropy.as_deref())?;
        if !execution.success {
            let message = execution.failure_message(step.operation.command());
            return Err(CeremonyError::DelegatedProcessFailure {
                step: step.name.clone(),
                message,
            });
        }

        for output in step.operation.outputs() {
            if !output.exists() {
                return Err(CeremonyError::MissingOutput {
                    step: step.name.clone(),
                    artifact: output.to_path_buf(),
                });
            }
        }

        if let Some(artifact) = step.operation.verifies() {
            debug!("{} verified", artifact.display());
            self.verified.insert(artifact.to_path_buf());
        }

        match step.operation.chain_link() {
            Some(link) => {
                let record = ContributionRecord {
                    contributor_no,
                    phase: plan.title.clone(),
                    name: link.name.to_string(),
                    date: Local::now().format("%Y-%m-%d").to_string(),
                    previous: link.previous.to_path_buf(),
                    previous_hash: blake2b_file(link.previous)?,
                    artifact: link.artifact.to_path_buf(),
                    artifact_hash: blake2b_file(link.artifact)?,
                    time_taken_seconds: started.elapsed().as_secs_f64(),
                };
                debug!(
                    "contribution {} '{}' -> {}",
                    record.contributor_no,
                    record.name,
                    record.artifact_hash
                );
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
