//! On-disk artifact naming.
//!
//! Every file the ceremony reads or writes lives in one workspace directory and is named so
//! that its position in the contribution chain can be read off the file name:
//! `pot12_0000.ptau` .. `pot12_0003.ptau`, `pot12_beacon.ptau`, `pot12_final.ptau` for the
//! universal setup and `<circuit>_0000.zkey` .. `<circuit>_final.zkey` for the circuit keys.

use crate::errors::{CeremonyError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Index of the simulated out-of-band contribution in both phases.
pub const EXTERNAL_ROUND: u32 = 3;

/// A circuit name that is safe to splice into file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CircuitName(String);

impl CircuitName {
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
        if invalid {
            return Err(CeremonyError::InvalidCircuitName(name.to_string()));
        }
        Ok(CircuitName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CircuitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    dir: PathBuf,
    power: u32,
}

impl ArtifactLayout {
    pub fn new(dir: impl Into<PathBuf>, power: u32) -> Self {
        Self {
            dir: dir.into(),
            power,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ptau(&self, index: u32) -> PathBuf {
        self.dir.join(format!("pot{}_{:04}.ptau", self.power, index))
    }

    pub fn ptau_beacon(&self) -> PathBuf {
        self.dir.join(format!("pot{}_beacon.ptau", self.power))
    }

    pub fn ptau_final(&self) -> PathBuf {
        self.dir.join(format!("pot{}_final.ptau", self.power))
    }

    pub fn challenge(&self, index: u32) -> PathBuf {
        self.dir.join(format!("challenge_{:04}", index))
    }

    pub fn response(&self, index: u32) -> PathBuf {
        self.dir.join(format!("response_{:04}", index))
    }

    pub fn r1cs(&self, circuit: &CircuitName) -> PathBuf {
        self.dir.join(format!("{}.r1cs", circuit))
    }

    pub fn zkey(&self, circuit: &CircuitName, index: u32) -> PathBuf {
        self.dir.join(format!("{}_{:04}.zkey", circuit, index))
    }

    pub fn zkey_final(&self, circuit: &CircuitName) -> PathBuf {
        self.dir.join(format!("{}_final.zkey", circuit))
    }

    pub fn phase2_challenge(&self, index: u32) -> PathBuf {
        self.dir.join(format!("challenge_phase2_{:04}", index))
    }

    pub fn phase2_response(&self, index: u32) -> PathBuf {
        self.dir.join(format!("response_phase2_{:04}", index))
    }

    pub fn verification_key(&self) -> PathBuf {
        self.dir.join("verification_key.json")
    }

    /// Witness generator emitted by the circuit compiler under `<circuit>_js/`.
    pub fn wasm(&self, circuit: &CircuitName) -> PathBuf {
        self.dir
            .join(format!("{}_js", circuit))
            .join(format!("{}.wasm", circuit))
    }

    pub fn proof(&self) -> PathBuf {
        self.dir.join("proof.json")
    }

    pub fn public_signals(&self) -> PathBuf {
        self.dir.join("public.json")
    }

    pub fn phase1_transcript(&self) -> PathBuf {
        self.dir.join("phase1_transcript.json")
    }

    pub fn phase2_transcript(&self, circuit: &CircuitName) -> PathBuf {
        self.dir.join(format!("{}_phase2_transcript.json", circuit))
    }
}

/// Static-file mirror served by the web front end.
#[derive(Debug, Clone)]
pub struct PublishedLayout {
    root: PathBuf,
}

impl PublishedLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn circuit_dir(&self, circuit: &CircuitName) -> PathBuf {
        self.root.join(format!("{}_js", circuit))
    }
}
