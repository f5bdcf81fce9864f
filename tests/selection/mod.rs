//! Picking the root task by name

use std::sync::atomic::{AtomicUsize, Ordering};

use taskgroup::{choose, run_cmd, Error, Scope, SelectError, TaskFn, TaskResult};

use crate::common::{tokio_builder, within};

static BUILDS: AtomicUsize = AtomicUsize::new(0);

async fn build(_: Scope) -> TaskResult {
    BUILDS.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

async fn clean(_: Scope) -> TaskResult {
    Ok(())
}

async fn deploy(_: Scope) -> TaskResult {
    Err("no credentials".into())
}

fn funcs() -> [TaskFn; 3] {
    [TaskFn::new(build), TaskFn::new(clean), TaskFn::new(deploy)]
}

#[tokio::test]
async fn test_run_cmd_runs_the_chosen_task() {
    let before = BUILDS.load(Ordering::SeqCst);
    within(run_cmd(tokio_builder(), ["BUILD"], &funcs()))
        .await
        .unwrap();
    assert_eq!(BUILDS.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn test_run_cmd_returns_task_errors() {
    let err = within(run_cmd(tokio_builder(), ["deploy"], &funcs()))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "task \"deploy\" finished with error: no credentials"
    );
    assert!(matches!(err, Error::Task(_)));
}

#[test]
fn test_selection_errors_list_known_tasks() {
    let err = choose(&["test"], &funcs()).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"unknown task "test"; known tasks (case-insensitive): ["build", "clean", "deploy"]"#
    );

    let err = choose::<&str>(&[], &funcs()).unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"no task specified, please choose one; known tasks (case-insensitive): ["build", "clean", "deploy"]"#
    );

    let err = choose(&["clean", "deploy"], &funcs()).unwrap_err();
    assert_eq!(
        err,
        SelectError::TooManyTasks {
            chosen: vec!["clean".to_string(), "deploy".to_string()]
        }
    );
}

#[test]
fn test_closures_cannot_be_selected() {
    let funcs = [TaskFn::new(build), TaskFn::new(|_: Scope| async { Ok(()) })];
    let err = choose(&["build"], &funcs).unwrap_err();
    assert!(matches!(err, SelectError::Unnamed { .. }));
    assert!(err.to_string().starts_with("unexpected unnamed task function \"closure#"));
}
