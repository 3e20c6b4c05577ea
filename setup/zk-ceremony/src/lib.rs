//! Orchestrates a Groth16 trusted setup ceremony on top of the `snarkjs` toolchain:
//! a universal powers-of-tau phase, a circuit-specific phase producing the proving and
//! verification keys, and the housekeeping around them (cleanup, publishing, proofs).

pub mod artifacts;
pub mod ceremony;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod entropy;
pub mod errors;
pub mod phase1;
pub mod phase2;
pub mod proof;
pub mod publish;
pub mod steps;
pub mod toolchain;
pub mod transcript;

pub use artifacts::{ArtifactLayout, CircuitName, PublishedLayout};
pub use ceremony::{CeremonyResult, TrustedSetupCeremony};
pub use cleaner::{CleanupReport, WorkspaceCleaner};
pub use config::CeremonyConfig;
pub use entropy::{EntropySource, FixedEntropy, InteractiveEntropy};
pub use errors::{CeremonyError, ErrorKind, Result};
pub use phase1::Phase1Orchestrator;
pub use phase2::Phase2Orchestrator;
pub use toolchain::{Execution, Operation, Snarkjs, Toolchain};
