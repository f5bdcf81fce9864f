//! Each composition helper on its own

use std::time::{Duration, Instant};

use taskgroup::{opt, par, ser, Group, Scope, TaskFn, TaskResult};
use test_case::test_case;

use crate::common::{failing, step, stuck, tokio_builder, tokio_group, within, Capture, Journal};

#[test_case(0 ; "zero")]
#[test_case(1 ; "one")]
#[test_case(5 ; "many")]
#[tokio::test]
async fn test_par_waits_for_all(count: usize) {
    const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];
    let journal = Journal::default();
    let funcs: Vec<_> = NAMES[..count]
        .iter()
        .map(|&name| step(&journal, name, 10))
        .collect();

    within(tokio_builder().run(&par(funcs))).await.unwrap();

    let mut entries = journal.entries();
    entries.sort();
    assert_eq!(entries, NAMES[..count]);
}

#[tokio::test]
async fn test_par_is_concurrent() {
    let journal = Journal::default();
    let funcs: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| step(&journal, name, 100))
        .collect();

    let start = Instant::now();
    within(tokio_builder().run(&par(funcs))).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(350));
}

#[tokio::test]
async fn test_par_fails_fast() {
    let journal = Journal::default();
    let group = tokio_group();
    let blocked = TaskFn::new(stuck);
    let fan = par([blocked.clone(), failing(&journal, "broken")]);

    let err = within(group.wait(&fan)).await.unwrap_err();
    assert!(err.to_string().contains("broken failed"));

    // The blocked sibling was neither cancelled nor marked finished
    let blocked = group.get(blocked.key()).unwrap();
    assert!(!blocked.is_done());
}

#[tokio::test]
async fn test_ser_orders_waits() {
    let journal = Journal::default();
    let chain = ser([
        step(&journal, "first", 40),
        step(&journal, "second", 20),
        step(&journal, "third", 0),
    ]);

    within(tokio_builder().run(&chain)).await.unwrap();
    assert_eq!(journal.entries(), ["first", "second", "third"]);
}

#[tokio::test]
async fn test_ser_short_circuits() {
    let journal = Journal::default();
    let chain = ser([
        step(&journal, "first", 0),
        failing(&journal, "second"),
        step(&journal, "third", 0),
    ]);

    let err = within(tokio_builder().run(&chain)).await.unwrap_err();
    assert!(err.to_string().contains("second failed"));
    assert_eq!(journal.entries(), ["first", "second"]);
}

#[tokio::test]
async fn test_ser_does_not_rerun_finished_tasks() {
    let journal = Journal::default();
    let first = step(&journal, "first", 0);
    let group = tokio_group();

    within(group.wait(&first)).await.unwrap();
    within(group.wait(&ser([first.clone(), first.clone()])))
        .await
        .unwrap();
    assert_eq!(journal.count("first"), 1);
}

#[tokio::test]
async fn test_opt_swallows_and_logs() {
    let journal = Journal::default();
    let capture = Capture::default();
    let broken = failing(&journal, "broken");

    let group = tokio_builder().log_sink(capture.sink()).build();
    within(group.wait(&opt(&broken))).await.unwrap();

    assert_eq!(
        capture.contents(),
        "[taskgroup] error: task \"broken\" finished with error: broken failed\n"
    );

    // Direct dependents still see the failure, without a second run
    let err = within(group.wait(&broken)).await.unwrap_err();
    assert_eq!(err.task_name(), "broken");
    assert_eq!(journal.count("broken"), 1);
}

#[tokio::test]
async fn test_opt_on_success_logs_nothing() {
    let journal = Journal::default();
    let capture = Capture::default();
    let group = tokio_builder().log_sink(capture.sink()).build();

    within(group.wait(&opt(step(&journal, "fine", 0))))
        .await
        .unwrap();
    assert_eq!(capture.contents(), "");
}

async fn nested(scope: Scope) -> TaskResult {
    let journal = Journal::default();
    let inner = par([
        ser([step(&journal, "x", 10), step(&journal, "y", 0)]),
        opt(failing(&journal, "z")),
    ]);
    scope.wait(&inner).await?;

    let mut entries = journal.entries();
    entries.sort();
    if entries != ["x", "y", "z"] {
        return Err(format!("unexpected journal {entries:?}").into());
    }
    Ok(())
}

#[tokio::test]
async fn test_helpers_nest() {
    within(tokio_builder().run(&TaskFn::new(nested)))
        .await
        .unwrap();
}

async fn awaits_cancellation(scope: Scope) -> TaskResult {
    scope.cancelled().await;
    scope.err()?;
    Ok(())
}

async fn also_awaits_cancellation(scope: Scope) -> TaskResult {
    scope.cancelled().await;
    scope.err()?;
    Ok(())
}

#[tokio::test]
async fn test_par_fails_fast_past_uncancelled_waiters() {
    let journal = Journal::default();
    let group = tokio_group();
    let fan = par([
        failing(&journal, "instant"),
        TaskFn::new(awaits_cancellation),
        TaskFn::new(also_awaits_cancellation),
    ]);

    let err = within(group.wait(&fan)).await.unwrap_err();
    assert!(err.to_string().ends_with("task \"instant\" finished with error: instant failed"));
    assert!(!group.context().is_cancelled());
    assert!(!group.get(TaskFn::new(awaits_cancellation).key()).unwrap().is_done());
}
