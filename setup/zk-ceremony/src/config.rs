use crate::artifacts::{ArtifactLayout, PublishedLayout};
use crate::errors::{CeremonyError, Result};
use crate::toolchain::{Beacon, Curve};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Largest power of tau the toolchain accepts.
pub const MAX_POWER: u32 = 28;
/// Bounds on the beacon's iteration exponent (2^n hash rounds).
pub const BEACON_ITERATIONS_RANGE: std::ops::RangeInclusive<u32> = 10..=63;

/// Configuration for a ceremony run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeremonyConfig {
    /// Build workspace holding the artifact chain
    pub workspace_dir: PathBuf,
    /// Root of the static-file mirror served by the front end
    pub public_circuits_dir: PathBuf,
    /// Toolchain executable
    pub snarkjs: PathBuf,
    pub curve: Curve,
    pub power: u32,
    pub beacon: Beacon,
    /// Pass `-v` to toolchain commands that support it
    pub verbose: bool,
}

impl Default for CeremonyConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("build"),
            public_circuits_dir: PathBuf::from("../nextjs/public/circuits"),
            snarkjs: PathBuf::from("snarkjs"),
            curve: Curve::Bn128,
            power: 12,
            beacon: Beacon::default(),
            verbose: true,
        }
    }
}

impl CeremonyConfig {
    pub fn read_from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CeremonyError::fs(path, e))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn write_into_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CeremonyError::fs(parent, e))?;
        }
        let file = File::create(path).map_err(|e| CeremonyError::fs(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.power == 0 || self.power > MAX_POWER {
            return Err(CeremonyError::InvalidConfig(format!(
                "power must be between 1 and {}, got {}",
                MAX_POWER, self.power
            )));
        }
        let hash = &self.beacon.hash;
        if hash.is_empty() || hash.len() % 2 != 0 || hex::decode(hash).is_err() {
            return Err(CeremonyError::InvalidConfig(format!(
                "beacon hash must be non-empty even-length hex, got '{}'",
                hash
            )));
        }
        if !BEACON_ITERATIONS_RANGE.contains(&self.beacon.iterations) {
            return Err(CeremonyError::InvalidConfig(format!(
                "beacon iteration exponent must be within {:?}, got {}",
                BEACON_ITERATIONS_RANGE, self.beacon.iterations
            )));
        }
        Ok(())
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.workspace_dir, self.power)
    }

    pub fn published(&self) -> PublishedLayout {
        PublishedLayout::new(&self.public_circuits_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ceremony_config_default() {
        let config = CeremonyConfig::default();
        assert_eq!(config.power, 12);
        assert_eq!(config.curve, Curve::Bn128);
        assert_eq!(
            config.beacon.hash,
            "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        );
        assert_eq!(config.beacon.iterations, 10);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.layout().ptau_final(),
            PathBuf::from("build/pot12_final.ptau")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ceremony.json");
        fs::write(&path, r#"{ "workspace_dir": "out", "beacon": { "iterations": 12 } }"#).unwrap();

        let config = CeremonyConfig::read_from_json(&path).unwrap();
        assert_eq!(config.workspace_dir, PathBuf::from("out"));
        assert_eq!(config.beacon.iterations, 12);
        assert_eq!(config.beacon.hash, Beacon::default().hash);
        assert_eq!(config.power, 12);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ceremony.json");
        let mut config = CeremonyConfig::default();
        config.curve = Curve::Bls12_381;
        config.write_into_json(&path).unwrap();
        assert_eq!(CeremonyConfig::read_from_json(&path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CeremonyConfig::default();
        config.power = 0;
        assert!(config.validate().is_err());

        let mut config = CeremonyConfig::default();
        config.beacon.hash = "abc".to_string();
        assert!(config.validate().is_err());

        let mut config = CeremonyConfig::default();
        config.beacon.hash = "zz".to_string();
        assert!(config.validate().is_err());

        let mut config = CeremonyConfig::default();
        config.beacon.iterations = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_file_is_filesystem_error() {
        let err = CeremonyConfig::read_from_json("/nonexistent/ceremony.json").unwrap_err();
        assert!(matches!(err, CeremonyError::FilesystemFailure { .. }));
    }
}
