//! Which task functions count as the same task

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskgroup::{Group, Scope, TaskFn, TaskResult};
use test_case::test_case;

use crate::common::{counting, tokio_group, within};

static STYLE_RUNS: AtomicUsize = AtomicUsize::new(0);

async fn styles(_: Scope) -> TaskResult {
    STYLE_RUNS.fetch_add(1, Ordering::SeqCst);
    Ok(())
}

#[tokio::test]
async fn test_same_fn_item_is_one_task() {
    let group = tokio_group();
    let before = STYLE_RUNS.load(Ordering::SeqCst);

    let a = group.task(&TaskFn::new(styles));
    let b = group.task(&TaskFn::new(styles));
    assert_eq!(a, b);
    within(a.wait()).await.unwrap();

    assert_eq!(STYLE_RUNS.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn test_equivalent_closures_are_distinct() {
    let group = tokio_group();
    let runs = Arc::new(AtomicUsize::new(0));

    let a = group.task(&counting(&runs));
    let b = group.task(&counting(&runs));
    assert_ne!(a, b);
    within(a.wait()).await.unwrap();
    within(b.wait()).await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test_case("deploy", "deploy", true ; "same name")]
#[test_case("deploy", "Deploy", false ; "names are case-sensitive keys")]
#[test_case("deploy", "publish", false ; "different names")]
fn test_named_identity(left: &str, right: &str, same: bool) {
    let a = TaskFn::named(left, |_: Scope| async { Ok(()) });
    let b = TaskFn::named(right, |_: Scope| async { Err("other".into()) });
    assert_eq!(a.key() == b.key(), same);
}

#[tokio::test]
async fn test_first_registration_wins_for_named() {
    let group = tokio_group();
    let first = TaskFn::named("deploy", |_: Scope| async { Ok(()) });
    let second = TaskFn::named("deploy", |_: Scope| async { Err("never runs".into()) });

    within(group.wait(&first)).await.unwrap();
    within(group.wait(&second)).await.unwrap();
}
