mod support;

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use taskdeck::events::ChangeBus;
use taskdeck::project::ProjectColor;
use taskdeck::storage::{FileStore, MemoryStore, Storage};
use taskdeck::task::NewTask;
use taskdeck::watch::StoreWatcher;
use taskdeck::Tracker;

use support::TestStore;

#[test]
fn contexts_sharing_a_store_converge_after_sync() {
    let storage = Storage::in_memory();
    let mut left = Tracker::open(storage.clone());
    let mut right = Tracker::open(storage.clone());

    let work = left.create_project("Work", ProjectColor::Green).unwrap();
    let task = left
        .create_task(NewTask::new("from left").project(&work.id))
        .unwrap();

    assert!(right.tasks().is_empty());
    assert!(right.sync());
    assert_eq!(right.tasks(), &[task]);
    assert_eq!(right.projects().len(), 2);
    assert!(!right.sync());
}

#[test]
fn concurrent_writers_last_write_wins() {
    let storage = Storage::in_memory();
    let mut left = Tracker::open(storage.clone());
    let mut right = Tracker::open(storage.clone());

    left.create_task(NewTask::new("left")).unwrap();
    // right has not synced, so its whole-collection write replaces left's
    right.create_task(NewTask::new("right")).unwrap();

    left.sync();
    let titles: Vec<&str> = left.tasks().iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["right"]);
}

#[test]
fn separate_buses_do_not_notify_each_other() {
    let backend = MemoryStore::new();
    let first = Storage::with_bus(backend.clone(), ChangeBus::new());
    let second = Storage::with_bus(backend, ChangeBus::new());

    let mut writer = Tracker::open(first);
    let mut reader = Tracker::open(second);
    writer.create_task(NewTask::new("quiet")).unwrap();

    assert!(!reader.sync());
    reader.reload();
    assert_eq!(reader.tasks().len(), 1);
}

#[test]
fn file_watcher_delivers_writes_from_another_storage() {
    let store = TestStore::new();
    let dir = store.store_dir();

    let bus = ChangeBus::new();
    let _watcher = StoreWatcher::spawn(&dir, bus.clone(), Duration::from_millis(20)).unwrap();
    let viewer_storage = Storage::with_bus(FileStore::new(&dir), bus);
    let mut viewer = Tracker::open(viewer_storage);

    // a second Storage has its own bus, like another process would
    let mut writer = Tracker::open(store.storage());
    let task = writer.create_task(NewTask::new("external")).unwrap();

    let mut seen = false;
    for _ in 0..50 {
        if viewer.wait_for_change(Duration::from_millis(100))
            && viewer.task(&task.id).is_some()
        {
            seen = true;
            break;
        }
    }
    assert!(seen, "watcher never reported the external write");
}

/// Collects stdout lines up to the closing brace of one pretty envelope.
fn next_envelope(lines: &Receiver<String>) -> Option<String> {
    let mut envelope = String::new();
    loop {
        let line = lines.recv_timeout(Duration::from_secs(10)).ok()?;
        envelope.push_str(&line);
        envelope.push('\n');
        if line == "}" {
            return Some(envelope);
        }
    }
}

#[test]
fn watch_command_reprints_after_write_from_another_process() {
    let store = TestStore::new();
    // Seed first so the watcher's own open does not write.
    let mut writer = Tracker::open(store.storage());
    let mut child = Command::new(assert_cmd::cargo::cargo_bin("taskdeck"))
        .current_dir(store.path())
        .env_remove("TASKDECK_DIR")
        .env_remove("RUST_LOG")
        .arg("--dir")
        .arg(store.store_dir())
        .args(["--json", "watch", "--max-updates", "1"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn watch");

    let stdout = child.stdout.take().expect("stdout");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let Some(initial) = next_envelope(&rx) else {
        let _ = child.kill();
        panic!("watch printed nothing");
    };
    assert!(initial.contains("\"total\": 0"));

    writer.create_task(NewTask::new("external")).unwrap();

    let Some(update) = next_envelope(&rx) else {
        let _ = child.kill();
        panic!("watch never reprinted after the external write");
    };
    assert!(update.contains("external"));
    assert!(child.wait().expect("wait").success());
}
