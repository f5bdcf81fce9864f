//! Tests with tracing feature enabled

use taskgroup::{opt, par, Scope, TaskFn, TaskResult};
use tracing_subscriber::{fmt, EnvFilter};

use crate::common::{tokio_builder, within};

async fn fine(_: Scope) -> TaskResult {
    Ok(())
}

async fn broken(_: Scope) -> TaskResult {
    Err("broken".into())
}

async fn panics(_: Scope) -> TaskResult {
    panic!("traced panic");
}

fn init() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tracing_with_subscriber() {
    init();

    let root = par([TaskFn::new(fine), opt(TaskFn::new(broken))]);
    within(tokio_builder().run(&root)).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tracing_failed_run() {
    init();

    let root = par([TaskFn::new(fine), TaskFn::new(panics)]);
    let err = within(tokio_builder().run(&root)).await.unwrap_err();
    assert!(err.to_string().contains("traced panic"));
}
