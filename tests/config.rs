mod support;

use std::fs;
use std::path::PathBuf;

use taskdeck::config::{Config, CONFIG_FILE};

use support::{taskdeck_cmd, TestStore};

#[test]
fn load_from_dir_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = Config::load_from_dir(dir.path());
    assert!(cfg.store.dir.is_none());
    assert_eq!(cfg.store.lock_timeout_ms, 5000);
    assert_eq!(cfg.watch.debounce_ms, 200);
}

#[test]
fn load_from_dir_defaults_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "[watch]\ndebounce_ms = 999999").expect("write");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.watch.debounce_ms, 200);
}

#[test]
fn load_rejects_zero_lock_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[store]\nlock_timeout_ms = 0").expect("write");
    assert!(Config::load(&path).is_err());
}

#[test]
fn load_keeps_relative_store_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[store]\ndir = \"data\"\n\n[watch]\ndebounce_ms = 50\n").expect("write");

    let loaded = Config::load(&path).expect("load");
    assert_eq!(loaded.store.dir, Some(PathBuf::from("data")));
    assert_eq!(loaded.store.lock_timeout_ms, 5000);
    assert_eq!(loaded.watch.debounce_ms, 50);
}

#[test]
fn cli_uses_store_dir_from_config() {
    let store = TestStore::new();
    store
        .write_config("[store]\ndir = \"configured\"\n")
        .expect("write config");

    taskdeck_cmd()
        .current_dir(store.path())
        .args(["task", "add", "configured task"])
        .assert()
        .success();

    assert!(store.path().join("configured").join("tasks.json").exists());
}
