//! # Site: a small build script
//!
//! A static site build expressed as task functions, selected from the command line.
//!
//! ```text
//! build  -> ser(clean, par(templates, opt(styles), images))
//! templates -> styles
//! deploy -> build
//! ```
//!
//! `styles` is shared by `templates` and the top-level `par`, and runs once.
//!
//! ## Running This Example
//! ```bash
//! cargo run --example site -- build
//! cargo run --example site -- DEPLOY
//! RUST_LOG=debug cargo run --example site --features tracing -- build
//! ```

use std::time::Duration;

use taskgroup::{
    must, opt, par, run_cmd_from_env, ser, Group, Scope, TaskFn, TaskGroup, TaskResult,
};

async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

async fn clean(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("clean");
    sleep(20).await;
    Ok(())
}

async fn styles(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("styles");
    sleep(80).await;
    Ok(())
}

async fn templates(scope: Scope) -> TaskResult {
    must(scope.wait(&TaskFn::new(styles)).await);

    let _timing = scope.log().timing("templates");
    sleep(50).await;
    Ok(())
}

async fn images(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("images");
    for _ in 0..4 {
        scope.err()?;
        sleep(25).await;
    }
    Ok(())
}

async fn build(scope: Scope) -> TaskResult {
    let steps = ser([
        TaskFn::new(clean),
        par([
            TaskFn::new(templates),
            opt(TaskFn::new(styles)),
            TaskFn::new(images),
        ]),
    ]);
    scope.wait(&steps).await?;
    Ok(())
}

async fn deploy(scope: Scope) -> TaskResult {
    scope.wait(&TaskFn::new(build)).await?;
    Err("no deployment target configured".into())
}

#[tokio::main]
async fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let builder = TaskGroup::builder().spawn_with(|fut| {
        tokio::spawn(fut);
    });
    let funcs = [
        TaskFn::new(build),
        TaskFn::new(clean),
        TaskFn::new(deploy),
    ];

    if let Err(err) = run_cmd_from_env(builder, &funcs).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
