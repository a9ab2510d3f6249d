use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A small, fast run.
fn write_config(path: &Path, case_id: &str) {
    let text = format!(
        r#"
[basic]
case_id = "{case_id}"
pop_size = 10
num_generations = 3

[mutations]
mutn_rate = 2.0

[population]
haploid_chromosome_number = 2
num_linkage_subunits = 20

[computation]
num_threads = 1
verbosity = 0
plot_allele_gens = 1
"#
    );
    fs::write(path, text).unwrap();
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("mendel"));
}

#[test]
fn test_mode_required() {
    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.assert().code(1);
}

#[test]
fn test_conflicting_modes_exit_one() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("run.toml");
    write_config(&config, "conflict");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-d")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_create_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("new.toml");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-c")
        .arg(&path)
        .arg("-D")
        .arg(temp.path().join("missing-defaults.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read defaults file"));

    let defaults = temp.path().join("defaults.toml");
    fs::write(&defaults, "[basic]\npop_size = 77\n").unwrap();
    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-c")
        .arg(&path)
        .arg("-D")
        .arg(&defaults)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote configuration"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("pop_size = 77"));
    assert!(written.contains("[computation]"));
}

#[test]
fn test_run_writes_outputs() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("run.toml");
    write_config(&config, "cli01");
    let output = temp.path().join("out");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-O")
        .arg(&output)
        .assert()
        .success();

    let fit = fs::read_to_string(output.join("mendel.fit")).unwrap();
    assert_eq!(fit.lines().filter(|l| !l.starts_with('#')).count(), 3);
    assert!(output.join("mendel.hst").exists());
    assert!(output.join("mendel.toml").exists());
    assert!(output.join("allele-bins/00000003.json").exists());
    assert!(output.join("normalized-allele-bins/00000001.json").exists());
}

#[test]
fn test_run_merges_defaults() {
    let temp = tempdir().unwrap();
    let defaults = temp.path().join("defaults.toml");
    fs::write(&defaults, "[basic]\nnum_generations = 2\n").unwrap();
    let config = temp.path().join("run.toml");
    fs::write(
        &config,
        "[basic]\ncase_id = \"merged\"\npop_size = 8\n\n[population]\nhaploid_chromosome_number = 2\nnum_linkage_subunits = 10\n\n[computation]\nverbosity = 0\nnum_threads = 1\n",
    )
    .unwrap();
    let output = temp.path().join("out");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-D")
        .arg(&defaults)
        .arg("-O")
        .arg(&output)
        .assert()
        .success();

    let fit = fs::read_to_string(output.join("mendel.fit")).unwrap();
    assert_eq!(fit.lines().filter(|l| !l.starts_with('#')).count(), 2);
    let saved = fs::read_to_string(output.join("mendel.toml")).unwrap();
    assert!(saved.contains("case_id = \"merged\""));
}

#[test]
fn test_run_with_zip() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("run.toml");
    write_config(&config, "zipped");
    let output = temp.path().join("out");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-O")
        .arg(&output)
        .arg("-z")
        .arg("-u")
        .arg("alice")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice-zipped.zip"));

    assert!(output.join("alice-zipped.zip").exists());
}

#[test]
fn test_invalid_config_fails() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[basic]\npop_size = 1\n").unwrap();
    let output = temp.path().join("out");

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-O")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pop_size"));
    assert!(!output.exists());
}

#[test]
fn test_unknown_model_fails() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[selection]\nselection_model = \"roulette\"\n").unwrap();

    let mut cmd = Command::cargo_bin("mendel").unwrap();
    cmd.arg("-f")
        .arg(&config)
        .arg("-O")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
