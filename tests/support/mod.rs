#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use taskdeck::storage::{FileStore, Storage};
use tempfile::TempDir;

/// A scratch working directory with a store directory inside it.
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    /// Library-side handle on the same files the binary uses.
    pub fn storage(&self) -> Storage {
        Storage::new(FileStore::new(self.store_dir()))
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".taskdeck.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_collection(&self, key: &str, contents: &str) -> std::io::Result<PathBuf> {
        let dir = self.store_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{key}.json"));
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_collection(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.store_dir().join(format!("{key}.json"))).ok()
    }

    /// `taskdeck --dir <store>` run from the scratch directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = taskdeck_cmd();
        cmd.current_dir(self.path());
        cmd.arg("--dir").arg(self.store_dir());
        cmd
    }

    /// Run with `--json`, assert success, and return the envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }
}

pub fn taskdeck_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskdeck").expect("binary");
    cmd.env_remove("TASKDECK_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}
