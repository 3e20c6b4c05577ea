use std::fs;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(bin: &str, args: &[&str], dir: &std::path::Path) -> Output {
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("SNARKJS_BIN", "/nonexistent/snarkjs")
        .output()
        .expect("failed to launch binary")
}

#[test]
fn test_clean_on_fresh_circuit_reports_missing_dirs() {
    let dir = tempdir().unwrap();
    let output = run(
        env!("CARGO_BIN_EXE_circom_clean"),
        &["NeverBuilt", "--public-dir", "public"],
        dir.path(),
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Directory not found").count(), 2);
    assert!(stdout.contains("Cleanup completed successfully"));
}

#[test]
fn test_clean_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("build")).unwrap();
    fs::create_dir_all(dir.path().join("public").join("Foo_js")).unwrap();
    let args = ["Foo", "--public-dir", "public"];

    let first = run(env!("CARGO_BIN_EXE_circom_clean"), &args, dir.path());
    let second = run(env!("CARGO_BIN_EXE_circom_clean"), &args, dir.path());

    assert!(first.status.success());
    assert!(second.status.success());
    assert!(!dir.path().join("build").exists());
    assert!(!dir.path().join("public").join("Foo_js").exists());
    assert!(dir.path().join("public").exists());
}

#[test]
fn test_phase2_without_ptau_exits_with_one() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("build")).unwrap();
    fs::write(dir.path().join("build").join("Foo.r1cs"), b"r1cs").unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_circuit_specific_setup"),
        &["Foo"],
        dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Phase 2 setup failed"));
    assert!(stderr.contains("pot12_final.ptau"));
    assert!(!dir.path().join("build").join("Foo_0000.zkey").exists());
}

#[test]
fn test_setup_without_r1cs_exits_with_one() {
    let dir = tempdir().unwrap();
    let output = run(env!("CARGO_BIN_EXE_trusted_setup"), &["Foo"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Compile your circuit first."));
    assert!(!dir.path().join("build").join("pot12_0000.ptau").exists());
}

#[test]
fn test_invalid_circuit_name_exits_with_one() {
    let dir = tempdir().unwrap();
    let output = run(env!("CARGO_BIN_EXE_circom_clean"), &["../escape"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid circuit name"));
}

#[test]
fn test_missing_argument_exits_with_one() {
    let dir = tempdir().unwrap();
    let output = run(env!("CARGO_BIN_EXE_trusted_setup"), &[], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_verify_without_proof_exits_with_one() {
    let dir = tempdir().unwrap();
    let output = run(env!("CARGO_BIN_EXE_groth16_proof"), &["verify"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("verification_key.json"));
}
