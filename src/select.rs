//! Choosing a task by name, for command-line scripts.

use std::ffi::OsString;

use crate::error::{Error, SelectError};
use crate::group::TaskGroupBuilder;
use crate::key::TaskFn;

/// Deduplicated set of selectable task functions, in registration order.
#[derive(Debug, Default)]
struct TaskFns(Vec<TaskFn>);

impl TaskFns {
    fn add(&mut self, func: TaskFn) -> Result<(), SelectError> {
        if !func.is_named() {
            return Err(SelectError::Unnamed {
                label: func.short_name().to_string(),
            });
        }
        // Same function twice, before two functions sharing a name
        if self.0.iter().any(|known| known.key() == func.key()) {
            return Err(SelectError::DuplicateTask {
                name: func.short_name().to_string(),
            });
        }
        if self.by_name(func.short_name()).is_some() {
            return Err(SelectError::DuplicateName {
                name: func.short_name().to_string(),
            });
        }
        self.0.push(func);
        Ok(())
    }

    fn by_name(&self, name: &str) -> Option<&TaskFn> {
        self.0
            .iter()
            .find(|func| func.short_name().to_lowercase() == name.to_lowercase())
    }

    fn short_names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|func| func.short_name().to_string())
            .collect()
    }
}

/// Select exactly one task function by name.
///
/// Names match short names case-insensitively. Fails if any candidate is unnamed, if the same
/// function is listed or selected twice, if two different functions share a name, if a name
/// is unknown, or if the names don't select exactly one function. Errors about unknown or
/// missing names list the known tasks.
///
/// ```
/// use taskgroup::{choose, Scope, TaskFn, TaskResult};
///
/// async fn build(_: Scope) -> TaskResult { Ok(()) }
/// async fn clean(_: Scope) -> TaskResult { Ok(()) }
///
/// let funcs = [TaskFn::new(build), TaskFn::new(clean)];
/// let chosen = choose(&["CLEAN"], &funcs).unwrap();
/// assert_eq!(chosen.short_name(), "clean");
/// ```
pub fn choose<S: AsRef<str>>(names: &[S], funcs: &[TaskFn]) -> Result<TaskFn, SelectError> {
    let mut known = TaskFns::default();
    for func in funcs {
        known.add(func.clone())?;
    }

    let mut chosen = TaskFns::default();
    for name in names {
        let name = name.as_ref();
        let func = known
            .by_name(name)
            .ok_or_else(|| SelectError::UnknownTask {
                name: name.to_string(),
                known: known.short_names(),
            })?;
        chosen.add(func.clone())?;
    }

    match chosen.0.len() {
        0 => Err(SelectError::NoTaskSelected {
            known: known.short_names(),
        }),
        1 => Ok(chosen.0.remove(0)),
        _ => Err(SelectError::TooManyTasks {
            chosen: chosen.short_names(),
        }),
    }
}

/// Select one task among `funcs` by the names in `args`, then run it in a new group.
pub async fn run_cmd<I, S>(builder: TaskGroupBuilder, args: I, funcs: &[TaskFn]) -> Result<(), Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let root = {
        let names: Vec<S> = args.into_iter().collect();
        choose(&names, funcs)?
    };
    builder.run(&root).await?;
    Ok(())
}

/// [`run_cmd`] with the process's command-line arguments (without the program name).
pub async fn run_cmd_from_env(builder: TaskGroupBuilder, funcs: &[TaskFn]) -> Result<(), Error> {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(OsString::into_string)
        .map(|arg| arg.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()))
        .collect();
    run_cmd(builder, args, funcs).await
}
