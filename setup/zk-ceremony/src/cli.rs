//! Argument handling shared by the ceremony binaries.

use crate::config::CeremonyConfig;
use crate::errors::Result;
use clap::{Args, Parser};
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

/// Workspace options common to every command
#[derive(Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build workspace holding the artifact chain
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Root of the published circuits mirror
    #[arg(long, value_name = "DIR")]
    pub public_dir: Option<PathBuf>,

    /// snarkjs executable
    #[arg(long, env = "SNARKJS_BIN", value_name = "PATH")]
    pub snarkjs: Option<PathBuf>,

    /// Power of tau (circuit size bound is 2^power constraints)
    #[arg(long)]
    pub power: Option<u32>,

    /// Pass -v to the toolchain
    #[arg(long)]
    pub verbose: Option<bool>,
}

impl WorkspaceArgs {
    pub fn into_config(self) -> Result<CeremonyConfig> {
        let mut config = match &self.config {
            Some(path) => CeremonyConfig::read_from_json(path)?,
            None => CeremonyConfig::default(),
        };
        if let Some(dir) = self.build_dir {
            config.workspace_dir = dir;
        }
        if let Some(dir) = self.public_dir {
            config.public_circuits_dir = dir;
        }
        if let Some(snarkjs) = self.snarkjs {
            config.snarkjs = snarkjs;
        }
        if let Some(power) = self.power {
            config.power = power;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Like [`Parser::parse`], but a usage error exits with status 1 instead of clap's 2.
pub fn parse_args<T: Parser>() -> std::result::Result<T, ExitCode> {
    T::try_parse().map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}

pub fn report<T, E: Display>(label: &str, result: std::result::Result<T, E>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}: {}", label, e);
            ExitCode::FAILURE
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init();
}
