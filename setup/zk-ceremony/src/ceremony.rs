use crate::artifacts::CircuitName;
use crate::config::CeremonyConfig;
use crate::entropy::EntropySource;
use crate::errors::Result;
use crate::phase1::Phase1Orchestrator;
use crate::phase2::{Phase2Orchestrator, COMPILE_CIRCUIT_FIRST};
use crate::steps::{Requirement, RunReport};
use crate::toolchain::Toolchain;
use std::path::PathBuf;
use std::time::Instant;

/// Full trusted setup: universal phase followed by the circuit-specific phase.
pub struct TrustedSetupCeremony {
    config: CeremonyConfig,
    circuit: CircuitName,
}

/// Results from a complete trusted setup ceremony
#[derive(Debug)]
pub struct CeremonyResult {
    pub circuit: CircuitName,
    pub phases: Vec<RunReport>,
    pub proving_key: PathBuf,
    pub verification_key: PathBuf,
    pub total_duration_secs: f64,
}

impl TrustedSetupCeremony {
    pub fn new(config: CeremonyConfig, circuit: CircuitName) -> Self {
        Self { config, circuit }
    }

    pub fn config(&self) -> &CeremonyConfig {
        &self.config
    }

    pub fn run(
        &self,
        toolchain: &mut dyn Toolchain,
        entropy: &mut dyn EntropySource,
    ) -> Result<CeremonyResult> {
        let layout = self.config.layout();
        println!("🎭 Starting trusted setup ceremony");
        println!("   Circuit: {}", self.circuit);
        println!("   Workspace: {}", layout.dir().display());
        let ceremony_start = Instant::now();

        // Phase 2 needs the compiled circuit; don't spend a whole Phase 1 finding that out.
        Requirement::new(layout.r1cs(&self.circuit), COMPILE_CIRCUIT_FIRST).check()?;

        let phase1 = Phase1Orchestrator::new(&self.config).run(toolchain, entropy)?;
        let phase2 = Phase2Orchestrator::new(&self.config, &self.circuit).run(toolchain, entropy)?;

        Ok(CeremonyResult {
            circuit: self.circuit.clone(),
            phases: vec![phase1, phase2],
            proving_key: layout.zkey_final(&self.circuit),
            verification_key: layout.verification_key(),
            total_duration_secs: ceremony_start.elapsed().as_secs_f64(),
        })
    }
}

impl std::fmt::Display for CeremonyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "🎭 Trusted Setup Ceremony Result")?;
        writeln!(f, "================================")?;
        writeln!(f, "Circuit: {}", self.circuit)?;
        writeln!(f, "Total duration: {:.2} seconds", self.total_duration_secs)?;
        writeln!(f)?;
        writeln!(f, "📊 Phase Summary:")?;
        for phase in &self.phases {
            writeln!(
                f,
                "  ✅ {}: {} steps, {} contributions, {:.2} seconds",
                phase.title,
                phase.completed.len(),
                phase.records.len(),
                phase.elapsed.as_secs_f64()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "📁 Generated files:")?;
        writeln!(f, "   Proving key: {}", self.proving_key.display())?;
        write!(f, "   Verification key: {}", self.verification_key.display())
    }
}
