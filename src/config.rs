#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{str::FromStr, sync::OnceLock, thread::available_parallelism};

use tracing::{Level, warn};

use crate::{
    analysis::AnalyzerOptions, constants::DEFAULT_MAX_SOURCE_BYTES, java::SemicolonSeverity,
};

/// Environment variable selecting where missing-semicolon findings go.
pub const SEMICOLON_SEVERITY_ENV: &str = "TASSIST_SEMICOLON_SEVERITY";
/// Environment variable capping the size of an analyzed source file.
pub const MAX_SOURCE_BYTES_ENV: &str = "TASSIST_MAX_SOURCE_BYTES";
/// Environment variable bounding the batch worker pool.
pub const WORKERS_ENV: &str = "TASSIST_WORKERS";
/// Environment variable holding the default log level.
pub const LOG_ENV: &str = "TASSIST_LOG";

/// Runtime settings shared across the crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// where missing-semicolon findings go
    semicolon_severity: SemicolonSeverity,
    /// largest source analyzed, in bytes
    max_source_bytes:   usize,
    /// batch worker pool size
    workers:            usize,
}

/// Parses `name` from `lookup`, falling back to `default` with a warning when
/// the value does not parse.
fn read<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        None => default,
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Ignoring {name}={value:?}: not a valid value.");
                default
            }
        },
    }
}

/// Number of cores, or one when that cannot be determined.
fn default_workers() -> usize {
    available_parallelism().map(usize::from).unwrap_or(1)
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let workers = read(&lookup, WORKERS_ENV, default_workers());
        Self {
            semicolon_severity: read(&lookup, SEMICOLON_SEVERITY_ENV, SemicolonSeverity::default()),
            max_source_bytes:   read(&lookup, MAX_SOURCE_BYTES_ENV, DEFAULT_MAX_SOURCE_BYTES),
            workers:            workers.max(1),
        }
    }

    /// Where missing-semicolon findings go.
    pub fn semicolon_severity(&self) -> SemicolonSeverity {
        self.semicolon_severity
    }

    /// Largest source analyzed, in bytes.
    pub fn max_source_bytes(&self) -> usize {
        self.max_source_bytes
    }

    /// Batch worker pool size, at least one.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyzer options derived from these settings.
    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions::builder()
            .semicolon_severity(self.semicolon_severity)
            .max_source_bytes(self.max_source_bytes)
            .build()
    }
}

/// The level named by `TASSIST_LOG`, if set and valid. Kept apart from
/// [`Settings`] because the subscriber needs it before anything can log.
pub fn log_level(lookup: impl Fn(&str) -> Option<String>) -> Option<Level> {
    lookup(LOG_ENV).and_then(|l| l.trim().parse().ok())
}

/// Global storage for the settings read at first use.
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Returns the process-wide settings, reading the environment on first use.
pub fn get() -> &'static Settings {
    SETTINGS.get_or_init(Settings::from_env)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[]);
        assert_eq!(s.semicolon_severity(), SemicolonSeverity::Error);
        assert_eq!(s.max_source_bytes(), DEFAULT_MAX_SOURCE_BYTES);
        assert!(s.workers() >= 1);
        assert_eq!(log_level(|_| None), None);
    }

    #[test]
    fn reads_and_tolerates_bad_values() {
        let s = settings(&[
            (SEMICOLON_SEVERITY_ENV, "warning"),
            (MAX_SOURCE_BYTES_ENV, "lots"),
            (WORKERS_ENV, "0"),
        ]);
        assert_eq!(s.semicolon_severity(), SemicolonSeverity::Warning);
        assert_eq!(s.max_source_bytes(), DEFAULT_MAX_SOURCE_BYTES);
        assert_eq!(s.workers(), 1);
        assert_eq!(s.analyzer_options().semicolon_severity, SemicolonSeverity::Warning);
    }

    #[test]
    fn log_level_reads_only_its_variable() {
        let lookup = |name: &str| (name == LOG_ENV).then(|| " debug ".to_string());
        assert_eq!(log_level(lookup), Some(Level::DEBUG));
        assert_eq!(log_level(|_| Some("loud".to_string())), None);
    }
}
