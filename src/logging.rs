//! Per-run log configuration.
//!
//! Each run builds its own subscriber from a [`LogConfig`] and installs it
//! only for the duration of that run with
//! [`tracing::subscriber::with_default`]. Nothing is registered globally, so
//! two runs in one process (tests, or a future front end) can log at
//! different levels to different sinks.
//!
//! Logs go to stderr; progress lines on stdout stay separate.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub verbose: u8,
    pub quiet: bool,
}

impl LogConfig {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Run `f` with a subscriber built from `config` as the thread's default.
///
/// Call this on the thread doing the work: `with_default` scopes the
/// subscriber to the current thread.
pub fn scoped<T>(config: &LogConfig, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}
