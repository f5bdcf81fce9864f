//! A -> par(B, C), B -> D, C -> opt(D), D fails

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskgroup::{opt, par, Group, Scope, TaskFn, TaskGroup};

use crate::common::{tokio_builder, within, Capture};

struct Diamond {
    a: TaskFn,
    b: TaskFn,
    c: TaskFn,
    d: TaskFn,
    d_runs: Arc<AtomicUsize>,
}

fn diamond() -> Diamond {
    let d_runs = Arc::new(AtomicUsize::new(0));
    let d = {
        let d_runs = Arc::clone(&d_runs);
        TaskFn::named("D", move |_: Scope| {
            let d_runs = Arc::clone(&d_runs);
            async move {
                d_runs.fetch_add(1, Ordering::SeqCst);
                Err("D is broken".into())
            }
        })
    };
    let b = {
        let d = d.clone();
        TaskFn::named("B", move |scope: Scope| {
            let d = d.clone();
            async move {
                scope.wait(&d).await?;
                Ok(())
            }
        })
    };
    let c = {
        let d = opt(&d);
        TaskFn::named("C", move |scope: Scope| {
            let d = d.clone();
            async move {
                scope.wait(&d).await?;
                Ok(())
            }
        })
    };
    let a = {
        let deps = par([&b, &c]);
        TaskFn::named("A", move |scope: Scope| {
            let deps = deps.clone();
            async move {
                scope.wait(&deps).await?;
                Ok(())
            }
        })
    };

    Diamond { a, b, c, d, d_runs }
}

fn outcome(group: &TaskGroup, func: &TaskFn) -> Result<(), String> {
    group
        .get(func.key())
        .expect("task was never requested")
        .result()
        .expect("task has not finished")
        .map_err(|err| err.to_string())
}

#[tokio::test]
async fn test_diamond() {
    let graph = diamond();
    let capture = Capture::default();
    let (group, root) = tokio_builder().log_sink(capture.sink()).start(&graph.a);

    let err = within(root.wait()).await.unwrap_err();
    within(group.wait(&graph.c)).await.unwrap();

    assert_eq!(graph.d_runs.load(Ordering::SeqCst), 1);

    let d_err = outcome(&group, &graph.d).unwrap_err();
    assert_eq!(d_err, "task \"D\" finished with error: D is broken");

    let b_err = outcome(&group, &graph.b).unwrap_err();
    assert_eq!(b_err, format!("task \"B\" finished with error: {d_err}"));

    outcome(&group, &graph.c).unwrap();

    assert_eq!(err.task_name(), "A");
    assert!(err.to_string().ends_with(&b_err));
    assert!(capture.contents().contains(&d_err));
}
