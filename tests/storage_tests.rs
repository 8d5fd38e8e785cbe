use fitout_timeline::models::Task;
use fitout_timeline::storage::{delete_snapshot, load_snapshot, save_snapshot, Snapshot};
use fitout_timeline::timeline::Timeline;
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

// Use a mutex to ensure tests run serially since they modify the environment variable
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_test_db<F>(test_name: &str, f: F)
where
    F: FnOnce(PathBuf),
{
    let _guard = TEST_MUTEX.lock().unwrap();

    let mut db_path = env::temp_dir();
    db_path.push(format!("fitout_timeline_test_{}.json", test_name));

    env::set_var("TIMELINE_DB", db_path.to_str().unwrap());
    if db_path.exists() {
        fs::remove_file(&db_path).unwrap();
    }

    f(db_path.clone());

    if db_path.exists() {
        fs::remove_file(&db_path).unwrap();
    }
    env::remove_var("TIMELINE_DB");
}

#[test]
fn test_save_and_load_snapshot() {
    with_test_db("save_load", |path| {
        assert!(load_snapshot().is_none());

        let snapshot = Snapshot {
            fetched_at: "2024-01-01T00:00:00+00:00".into(),
            api_url: "http://localhost:5000/api".into(),
            timeline: Timeline {
                tasks: vec![Task {
                    id: "t1".into(),
                    title: "Paint".into(),
                    start_date: json!("2024-01-10"),
                    end_date: json!("2024-01-05"),
                    progress: Some(20),
                    ..Default::default()
                }],
                ..Default::default()
            },
        };
        save_snapshot(&snapshot).unwrap();
        assert!(path.exists());

        let loaded = load_snapshot().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.timeline.calendar().len(), 1);
    });
}

#[test]
fn test_corrupt_snapshot_is_ignored() {
    with_test_db("corrupt", |path| {
        fs::write(&path, "{ not json").unwrap();
        assert!(load_snapshot().is_none());
    });
}

#[test]
fn test_delete_snapshot() {
    with_test_db("delete", |path| {
        save_snapshot(&Snapshot::default()).unwrap();
        assert!(path.exists());
        delete_snapshot().unwrap();
        assert!(!path.exists());
        // Deleting twice is fine.
        delete_snapshot().unwrap();
    });
}
