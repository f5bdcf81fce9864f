//! Side channel for reporting task errors and timings.
//!
//! Nothing written here affects task outcomes: by the time an error reaches the sink, its task
//! has already recorded it. Write failures are ignored.
//!
//! Each [`crate::TaskGroup`] carries its own sink (standard error unless configured), so tests
//! and embedding applications can capture the output without touching global state. With the
//! `tracing` feature enabled, the same reports are also emitted as `tracing` events.

use std::error::Error as StdError;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{info, warn};

use crate::key::TaskFn;

/// Clonable, thread-safe writer for diagnostics.
#[derive(Clone)]
pub struct LogSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl LogSink {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    /// Discard everything.
    pub fn sink() -> Self {
        Self::new(std::io::sink())
    }

    /// Report a non-fatal error and continue.
    ///
    /// ```
    /// use taskgroup::LogSink;
    ///
    /// LogSink::stderr().log_error(&std::fmt::Error);
    /// // [taskgroup] error: an error occurred when formatting an argument
    /// ```
    pub fn log_error(&self, err: &(dyn StdError + 'static)) {
        #[cfg(feature = "tracing")]
        warn!(error = %err, "ignoring task error");

        self.write_line(format_args!("[taskgroup] error: {err}"));
    }

    /// Log the error, if any, and otherwise do nothing.
    pub fn log<E: StdError + 'static>(&self, result: Result<(), E>) {
        if let Err(err) = result {
            self.log_error(&err);
        }
    }

    /// Report when an arbitrary piece of work starts, and how long it took once the returned
    /// guard drops:
    ///
    /// ```text
    /// [styles] starting
    /// [styles] done in 1.2ms
    /// ```
    pub fn timing(&self, name: impl Into<String>) -> Timing {
        let name = name.into();
        self.write_line(format_args!("[{name}] starting"));
        Timing {
            name,
            start: Instant::now(),
            sink: self.clone(),
        }
    }

    /// [`LogSink::timing`] under the task function's short name.
    pub fn task_timing(&self, func: &TaskFn) -> Timing {
        self.timing(func.short_name())
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}

/// Guard returned by [`LogSink::timing`]. Reports the elapsed time when dropped.
#[must_use = "the elapsed time is reported when the guard is dropped"]
pub struct Timing {
    name: String,
    start: Instant,
    sink: LogSink,
}

impl Timing {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timing {
    fn drop(&mut self) {
        let elapsed = self.elapsed();

        #[cfg(feature = "tracing")]
        info!(name = %self.name, ?elapsed, "done");

        self.sink
            .write_line(format_args!("[{}] done in {:?}", self.name, elapsed));
    }
}

impl std::fmt::Debug for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timing")
            .field("name", &self.name)
            .field("start", &self.start)
            .finish()
    }
}
