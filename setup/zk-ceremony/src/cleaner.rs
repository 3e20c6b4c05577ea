use crate::errors::{CeremonyError, Result};
use std::fs;
use std::path::PathBuf;

/// Removes a circuit's build workspace and its published artifacts.
#[derive(Debug, Clone)]
pub struct WorkspaceCleaner {
    targets: Vec<PathBuf>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl WorkspaceCleaner {
    pub fn new(build_dir: impl Into<PathBuf>, published_dir: impl Into<PathBuf>) -> Self {
        Self {
            targets: vec![build_dir.into(), published_dir.into()],
        }
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    /// Absent directories are reported and skipped; only a failed deletion is an error.
    pub fn clean(&self) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();
        for target in &self.targets {
            if target.exists() {
                fs::remove_dir_all(target).map_err(|e| CeremonyError::fs(target, e))?;
                println!("✅ Deleted: {}", target.display());
                report.removed.push(target.clone());
            } else {
                println!("ℹ️  Directory not found: {}", target.display());
                report.missing.push(target.clone());
            }
        }
        println!("🎉 Cleanup completed successfully!");
        Ok(report)
    }
}
