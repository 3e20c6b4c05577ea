//! Proof generation, off-chain verification and on-chain calldata, delegated to the toolchain.

use crate::artifacts::{ArtifactLayout, CircuitName};
use crate::errors::{CeremonyError, Result};
use crate::toolchain::{Execution, Operation, Toolchain};
use log::{info, warn};
use num_bigint::BigUint;
use num_traits::Num;
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProofArtifacts {
    pub proof_path: PathBuf,
    pub public_path: PathBuf,
    pub proof: serde_json::Value,
    pub public_signals: serde_json::Value,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path).map_err(|e| CeremonyError::fs(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Checks the operation's inputs, then runs it. A non-zero exit is still `Ok`.
fn launch(toolchain: &mut dyn Toolchain, operation: &Operation) -> Result<Execution> {
    for input in operation.inputs() {
        if !input.exists() {
            return Err(CeremonyError::PreconditionMissing {
                artifact: input.to_path_buf(),
                remedy: format!("'{}' needs it as input.", operation.command()),
            });
        }
    }
    toolchain.execute(operation, None)
}

fn run(toolchain: &mut dyn Toolchain, operation: &Operation) -> Result<Option<String>> {
    let execution = launch(toolchain, operation)?;
    if !execution.success {
        return Err(CeremonyError::DelegatedProcessFailure {
            step: operation.command().to_string(),
            message: execution.failure_message(operation.command()),
        });
    }
    Ok(execution.stdout)
}

/// Computes the witness for `input` and proves it against the circuit's final zkey.
pub fn generate_proof(
    toolchain: &mut dyn Toolchain,
    layout: &ArtifactLayout,
    circuit: &CircuitName,
    input: &Path,
) -> Result<ProofArtifacts> {
    let operation = Operation::Groth16FullProve {
        input: input.to_path_buf(),
        wasm: layout.wasm(circuit),
        zkey: layout.zkey_final(circuit),
        proof: layout.proof(),
        public: layout.public_signals(),
    };
    run(toolchain, &operation)?;

    let proof_path = layout.proof();
    let public_path = layout.public_signals();
    for output in [&proof_path, &public_path] {
        if !output.exists() {
            return Err(CeremonyError::MissingOutput {
                step: operation.command().to_string(),
                artifact: output.clone(),
            });
        }
    }
    info!("proof written to {}", proof_path.display());
    Ok(ProofArtifacts {
        proof: read_json(&proof_path)?,
        public_signals: read_json(&public_path)?,
        proof_path,
        public_path,
    })
}

/// `Ok(false)` when the toolchain rejects the proof; `Err` only when it could not be asked.
pub fn verify_proof(
    toolchain: &mut dyn Toolchain,
    verification_key: &Path,
    public: &Path,
    proof: &Path,
) -> Result<bool> {
    let operation = Operation::Groth16Verify {
        verification_key: verification_key.to_path_buf(),
        public: public.to_path_buf(),
        proof: proof.to_path_buf(),
    };
    let execution = launch(toolchain, &operation)?;
    if !execution.success {
        warn!("proof rejected: {}", execution.failure_message(operation.command()));
    }
    Ok(execution.success)
}

pub fn export_calldata(
    toolchain: &mut dyn Toolchain,
    public: &Path,
    proof: &Path,
) -> Result<SolidityCalldata> {
    let operation = Operation::ExportSolidityCalldata {
        public: public.to_path_buf(),
        proof: proof.to_path_buf(),
    };
    let stdout = run(toolchain, &operation)?.unwrap_or_default();
    SolidityCalldata::parse(&stdout)
}

/// Arguments of a Groth16 verifier contract's `verifyProof(a, b, c, input)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolidityCalldata {
    #[serde(serialize_with = "serialize_decimal")]
    pub a: [BigUint; 2],
    #[serde(serialize_with = "serialize_decimal_pairs")]
    pub b: [[BigUint; 2]; 2],
    #[serde(serialize_with = "serialize_decimal")]
    pub c: [BigUint; 2],
    #[serde(serialize_with = "serialize_decimal")]
    pub input: Vec<BigUint>,
}

impl SolidityCalldata {
    /// Parses the toolchain's calldata string, e.g.
    /// `["0x1", "0x2"],[["0x3", "0x4"],["0x5", "0x6"]],["0x7", "0x8"],["0x9"]`.
    pub fn parse(calldata: &str) -> Result<Self> {
        let cleaned: String = calldata
            .chars()
            .filter(|c| !matches!(c, '"' | '[' | ']') && !c.is_whitespace())
            .collect();
        let values = cleaned
            .split(',')
            .filter(|v| !v.is_empty())
            .map(parse_uint)
            .collect::<Result<Vec<_>>>()?;
        if values.len() < 8 {
            return Err(CeremonyError::Calldata(format!(
                "expected at least 8 values, found {}",
                values.len()
            )));
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let a = [next(), next()];
        let b = [[next(), next()], [next(), next()]];
        let c = [next(), next()];
        let input = values.collect();
        Ok(Self { a, b, c, input })
    }
}

fn parse_uint(value: &str) -> Result<BigUint> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => BigUint::from_str_radix(hex, 16),
        None => BigUint::from_str_radix(value, 10),
    };
    parsed.map_err(|_| CeremonyError::Calldata(format!("'{}' is not an unsigned integer", value)))
}

fn serialize_decimal<S>(values: &[BigUint], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(values.iter().map(|v| v.to_str_radix(10)))
}

fn serialize_decimal_pairs<S>(
    values: &[[BigUint; 2]; 2],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(
        values
            .iter()
            .map(|pair| [pair[0].to_str_radix(10), pair[1].to_str_radix(10)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLDATA: &str = concat!(
        r#"["0x01", "0x02"],[["0x03", "0x04"],["0x05", "0x06"]],["0x07", "0x08"],"#,
        r#"["0x0000000000000000000000000000000000000000000000000000000000000021"]"#
    );

    #[test]
    fn test_parse_maps_values_to_arguments() {
        let calldata = SolidityCalldata::parse(CALLDATA).unwrap();
        let n = |v: u32| BigUint::from(v);
        assert_eq!(calldata.a, [n(1), n(2)]);
        assert_eq!(calldata.b, [[n(3), n(4)], [n(5), n(6)]]);
        assert_eq!(calldata.c, [n(7), n(8)]);
        assert_eq!(calldata.input, vec![n(33)]);
    }

    #[test]
    fn test_parse_accepts_decimal_and_multiple_inputs() {
        let calldata = SolidityCalldata::parse("1,2,3,4,5,6,7,8,9,10\n").unwrap();
        assert_eq!(calldata.input, vec![BigUint::from(9u32), BigUint::from(10u32)]);
    }

    #[test]
    fn test_parse_rejects_short_or_garbage() {
        assert!(matches!(
            SolidityCalldata::parse(r#"["0x1","0x2"]"#),
            Err(CeremonyError::Calldata(_))
        ));
        assert!(matches!(
            SolidityCalldata::parse("1,2,3,4,5,6,7,zz"),
            Err(CeremonyError::Calldata(_))
        ));
    }

    #[test]
    fn test_serializes_as_decimal_strings() {
        let calldata = SolidityCalldata::parse(CALLDATA).unwrap();
        let json = serde_json::to_value(&calldata).unwrap();
        assert_eq!(json["a"], serde_json::json!(["1", "2"]));
        assert_eq!(json["b"], serde_json::json!([["3", "4"], ["5", "6"]]));
        assert_eq!(json["input"], serde_json::json!(["33"]));
    }
}
