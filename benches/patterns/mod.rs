
use taskgroup::{Scope, TaskFn, TaskGroup, TaskGroupBuilder};

pub fn tokio_builder() -> TaskGroupBuilder {
    TaskGroup::builder().spawn_with(|fut| {
        tokio::spawn(fut);
    })
}

pub fn noop() -> TaskFn {
    TaskFn::anonymous(|_: Scope| async { Ok(()) })
}
