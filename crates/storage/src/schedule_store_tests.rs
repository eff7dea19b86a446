use super::*;

#[test]
fn missing_file_yields_empty_vec() {
    let tmp = tempfile::tempdir().unwrap();
    assert_eq!(load_tasks(tmp.path()).unwrap(), Vec::new());
}

#[test]
fn round_trips_task_list() {
    let tmp = tempfile::tempdir().unwrap();
    let tasks = vec![
        ScheduledTask::new("* * * * *", "ping", None, 0).unwrap(),
        ScheduledTask::new("0 9 * * 1-5", "standup", Some("reviewer".into()), 10).unwrap(),
    ];
    save_tasks(tmp.path(), &tasks).unwrap();
    let loaded = load_tasks(tmp.path()).unwrap();
    assert_eq!(loaded, tasks);
}

#[test]
fn saving_replaces_the_whole_list() {
    let tmp = tempfile::tempdir().unwrap();
    let first = vec![ScheduledTask::new("* * * * *", "a", None, 0).unwrap()];
    save_tasks(tmp.path(), &first).unwrap();
    save_tasks(tmp.path(), &[]).unwrap();
    assert_eq!(load_tasks(tmp.path()).unwrap(), Vec::new());
}
