//! Integration tests for the linepos command line.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("words.txt")
}

/// Run linepos with an isolated config file and no color
fn run(args: &[&str], config: &Path, stdin: Option<&[u8]>) -> (Vec<u8>, String, bool) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_linepos"))
        .arg("--no-color")
        .arg("--config")
        .arg(config)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run linepos");

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            // the child may exit before reading when its arguments are rejected
            let _ = pipe.write_all(input);
        }
    }

    let output = child.wait_with_output().unwrap();
    (
        output.stdout,
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// A temp dir holding a default config file
fn config_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();
    (dir, path)
}

#[test]
fn test_encode_prints_positions() {
    let (_dir, config) = config_dir();
    let store = fixture_path();
    let (out, err, ok) = run(
        &["encode", store.to_str().unwrap(), "deg", "zzz", "a"],
        &config,
        None,
    );
    assert!(ok, "stderr: {err}");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "53\tdeg\nnot found\tzzz\n0\ta\n"
    );
}

#[test]
fn test_decode_every_strategy() {
    let (_dir, config) = config_dir();
    let store = fixture_path();
    for strategy in ["full", "direct", "cached"] {
        let (out, err, ok) = run(
            &[
                "decode",
                store.to_str().unwrap(),
                "--strategy",
                strategy,
                "43",
                "37",
                "-1",
            ],
            &config,
            None,
        );
        assert!(ok, "{strategy}: {err}");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "43\tbcd\nnot found\t37\nnot found\t-1\n",
            "{strategy}"
        );
    }
}

#[test]
fn test_encode_json() {
    let (_dir, config) = config_dir();
    let store = fixture_path();
    let (out, _, ok) = run(
        &["encode", store.to_str().unwrap(), "ijk", "--json"],
        &config,
        None,
    );
    assert!(ok);

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json[0]["position"], 57);
    assert_eq!(json[0]["found"], true);
}

#[test]
fn test_pack_then_unpack() {
    let (dir, config) = config_dir();
    let store = fixture_path();
    let packed = dir.path().join("packed.bin");

    let (_, err, ok) = run(
        &[
            "pack",
            store.to_str().unwrap(),
            "--byte-len",
            "2",
            "--output",
            packed.to_str().unwrap(),
        ],
        &config,
        Some(b"ijkl\nabcd\n"),
    );
    assert!(ok, "stderr: {err}");
    assert_eq!(fs::read(&packed).unwrap(), vec![0, 61, 0, 38]);

    let (out, err, ok) = run(
        &[
            "unpack",
            store.to_str().unwrap(),
            "--byte-len",
            "2",
            "--input",
            packed.to_str().unwrap(),
        ],
        &config,
        None,
    );
    assert!(ok, "stderr: {err}");
    assert_eq!(String::from_utf8(out).unwrap(), "61\tijkl\n38\tabcd\n");
}

#[test]
fn test_pack_unknown_key_fails() {
    let (_dir, config) = config_dir();
    let store = fixture_path();
    let (_, err, ok) = run(&["pack", store.to_str().unwrap()], &config, Some(b"nope\n"));
    assert!(!ok);
    assert!(err.contains("nope"), "stderr: {err}");
}

#[test]
fn test_verify_detects_unsorted_store() {
    let (dir, config) = config_dir();

    let (_, err, ok) = run(&["verify", fixture_path().to_str().unwrap()], &config, None);
    assert!(ok, "stderr: {err}");

    let unsorted = dir.path().join("unsorted.txt");
    fs::write(&unsorted, "b\na\nc\n").unwrap();
    let (_, _, ok) = run(&["verify", unsorted.to_str().unwrap()], &config, None);
    assert!(!ok);
}

#[test]
fn test_config_strategy_is_used() {
    let (dir, _) = config_dir();
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{"strategy": "full", "byte_len": 9}"#).unwrap();
    let store = fixture_path();

    // lookups ignore byte_len, packing rejects it
    let (_, _, ok) = run(&["encode", store.to_str().unwrap(), "bcd"], &config, None);
    assert!(ok);
    let (_, err, ok) = run(&["pack", store.to_str().unwrap()], &config, Some(b"bcd\n"));
    assert!(!ok);
    assert!(err.contains("byte_len"), "stderr: {err}");
}

#[test]
fn test_config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("fresh.json");

    let output = Command::new(env!("CARGO_BIN_EXE_linepos"))
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let written: serde_json::Value =
        serde_json::from_slice(&fs::read(&config).unwrap()).unwrap();
    assert_eq!(written["strategy"], "cached");
    assert_eq!(written["byte_len"], 3);
}
