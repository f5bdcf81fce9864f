//! # Diamond: shared dependencies and optional waits
//!
//! ```text
//!   A            A -> par(B, C)
//!  / \           B -> D
//! B   C          C -> opt(D)
//!  \ /
//!   D
//! ```
//!
//! D runs once even though both B and C wait on it. When D fails, B fails with D's error and
//! C only logs it, so A fails with D's error carried through B.
//!
//! ## Running This Example
//! ```bash
//! cargo run --example diamond
//! cargo run --example diamond -- fail
//! ```

use std::time::Duration;

use taskgroup::{opt, par, Group, Scope, TaskFn, TaskGroup, TaskResult};

async fn a(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("A");
    scope
        .wait(&par([TaskFn::new(b), TaskFn::new(c)]))
        .await?;
    Ok(())
}

async fn b(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("B");
    scope.wait(&TaskFn::new(d)).await?;
    Ok(())
}

async fn c(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("C");
    scope.wait(&opt(TaskFn::new(d))).await?;
    Ok(())
}

async fn d(scope: Scope) -> TaskResult {
    let _timing = scope.log().timing("D");
    tokio::time::sleep(Duration::from_millis(100)).await;

    if std::env::args().any(|arg| arg == "fail") {
        return Err("D could not finish".into());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let result = TaskGroup::builder()
        .spawn_with(|fut| {
            tokio::spawn(fut);
        })
        .run(&TaskFn::new(a))
        .await;

    match result {
        Ok(()) => println!("\nA succeeded"),
        Err(err) => {
            println!("\nA failed: {err}");
            std::process::exit(1);
        }
    }
}
