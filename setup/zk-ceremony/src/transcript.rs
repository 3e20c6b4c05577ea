use crate::errors::{CeremonyError, Result};
use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContributionRecord {
    pub contributor_no: u32,
    pub phase: String,
    pub name: String,
    pub date: String,
    pub previous: PathBuf,
    pub previous_hash: String,
    pub artifact: PathBuf,
    pub artifact_hash: String,
    pub time_taken_seconds: f64,
}

impl fmt::Display for ContributionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "### Contributor No: {:02} ({})\n\n\
            **Date:** {}\n\n\
            Name: {}\n\n\
            Previous artifact: {}\n    Blake2b: {}\n\
            Response artifact: {}\n    Blake2b: {}\n\n\
            Time taken: ~{:.2} seconds",
            self.contributor_no,
            self.phase,
            self.date,
            self.name,
            self.previous.display(),
            self.previous_hash,
            self.artifact.display(),
            self.artifact_hash,
            self.time_taken_seconds,
        )
    }
}

/// Provenance trail of one orchestrator run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CeremonyTranscript {
    pub title: String,
    pub records: Vec<ContributionRecord>,
}

impl CeremonyTranscript {
    pub fn new(title: impl Into<String>, records: Vec<ContributionRecord>) -> Self {
        Self {
            title: title.into(),
            records,
        }
    }

    pub fn read_from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CeremonyError::fs(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
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
}

impl fmt::Display for CeremonyTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.title)?;
        for record in &self.records {
            writeln!(f)?;
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Hex BLAKE2b-512 digest of a file's contents.
pub fn blake2b_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CeremonyError::fs(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Blake2b512::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|e| CeremonyError::fs(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
