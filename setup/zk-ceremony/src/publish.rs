use crate::artifacts::CircuitName;
use crate::config::CeremonyConfig;
use crate::errors::{CeremonyError, Result};
use crate::steps::Requirement;
use std::fs;
use std::path::PathBuf;

/// Copies the files the web front end serves (witness generator, final proving key and
/// verification key) into `{public}/{circuit}_js/`.
pub fn publish_circuit(config: &CeremonyConfig, circuit: &CircuitName) -> Result<Vec<PathBuf>> {
    let layout = config.layout();
    let sources = [
        Requirement::new(
            layout.wasm(circuit),
            "Compile your circuit with --wasm first.",
        ),
        Requirement::new(
            layout.zkey_final(circuit),
            "Run the circuit-specific setup first.",
        ),
        Requirement::new(
            layout.verification_key(),
            "Run the circuit-specific setup first.",
        ),
    ];
    for source in &sources {
        source.check()?;
    }

    let target_dir = config.published().circuit_dir(circuit);
    fs::create_dir_all(&target_dir).map_err(|e| CeremonyError::fs(&target_dir, e))?;

    let mut published = Vec::with_capacity(sources.len());
    for source in &sources {
        let Some(file_name) = source.artifact.file_name() else {
            continue;
        };
        let target = target_dir.join(file_name);
        fs::copy(&source.artifact, &target).map_err(|e| CeremonyError::fs(&target, e))?;
        println!("   📄 Published {}", target.display());
        published.push(target);
    }
    Ok(published)
}
