mod support;

use taskdeck::project::{ProjectColor, DEFAULT_PROJECT_ID};
use taskdeck::task::{Priority, TaskStatus};
use taskdeck::Tracker;

use support::TestStore;

#[test]
fn corrupt_tasks_load_as_empty_and_next_write_repairs() {
    let store = TestStore::new();
    store.write_collection("tasks", "{ this is not json").unwrap();

    let listed = store.json(&["task", "list"]);
    assert_eq!(listed["data"]["total"], 0);

    store.json(&["task", "add", "fresh start"]);
    let raw = store.read_collection("tasks").expect("tasks rewritten");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
}

#[test]
fn corrupt_projects_are_reseeded() {
    let store = TestStore::new();
    store.write_collection("projects", "[1, 2,").unwrap();

    let tracker = Tracker::open(store.storage());
    assert_eq!(tracker.projects().len(), 1);
    assert_eq!(tracker.projects()[0].id, DEFAULT_PROJECT_ID);
    let raw = store.read_collection("projects").expect("seed written");
    assert!(raw.contains("General"));
}

#[test]
fn null_and_blank_collections_are_empty() {
    let store = TestStore::new();
    store.write_collection("tasks", "null").unwrap();
    assert!(Tracker::open(store.storage()).tasks().is_empty());

    store.write_collection("tasks", "   \n").unwrap();
    assert!(Tracker::open(store.storage()).tasks().is_empty());
}

#[test]
fn lenient_record_decoding() {
    let store = TestStore::new();
    store
        .write_collection(
            "projects",
            r#"[
                {"id":"default","name":"General","color":"bg-primary"},
                {"id":"p1","name":"Side","color":"bg-purple-600","createdAt":"2024-01-02T03:04:05Z"}
            ]"#,
        )
        .unwrap();
    store
        .write_collection(
            "tasks",
            r#"[
                {"id":"t1","title":"old","status":"completed","dueDate":"",
                 "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"},
                {"id":"t2","title":"stamped","priority":"high","projectId":"p1",
                 "dueDate":"2024-03-04T10:00:00.000Z",
                 "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"},
                {"id":"t3","title":"garbled date","dueDate":"soon",
                 "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

    let tracker = Tracker::open(store.storage());
    assert_eq!(tracker.projects()[0].color, ProjectColor::Maroon);
    assert_eq!(tracker.project("p1").map(|p| p.color), Some(ProjectColor::Purple));

    let t1 = tracker.task("t1").expect("t1");
    assert_eq!(t1.status, TaskStatus::Completed);
    assert_eq!(t1.priority, Priority::Medium);
    assert_eq!(t1.project_id, DEFAULT_PROJECT_ID);
    assert_eq!(t1.description, "");
    assert_eq!(t1.due_date, None);

    let t2 = tracker.task("t2").expect("t2");
    assert_eq!(t2.due_date.map(|d| d.to_string()), Some("2024-03-04".to_string()));
    assert_eq!(tracker.project_for(t2).name, "Side");

    assert_eq!(tracker.task("t3").and_then(|t| t.due_date), None);
}

#[test]
fn writes_leave_no_temp_files() {
    let store = TestStore::new();
    store.json(&["task", "add", "one"]);
    store.json(&["task", "add", "two"]);

    let mut names: Vec<String> = std::fs::read_dir(store.store_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["projects.json", "projects.json.lock", "tasks.json", "tasks.json.lock"]
    );
}

#[test]
fn summary_flags_tasks_of_a_missing_project() {
    let store = TestStore::new();
    store
        .write_collection(
            "tasks",
            r#"[{"id":"t1","title":"stray","projectId":"gone",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

    let value = store.json(&["summary"]);
    assert_eq!(value["data"]["orphaned_tasks"], 1);
    assert_eq!(value["warnings"][0], "1 task(s) reference a deleted project");
    assert_eq!(value["next_steps"][0], "taskdeck task edit <ID> --project <PROJECT>");

    let clean = TestStore::new();
    let value = clean.json(&["summary"]);
    assert!(value.get("warnings").is_none());
    assert!(value.get("next_steps").is_none());
}
