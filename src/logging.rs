//! Logger setup for programs and tests using this crate.
//!
//! The tree itself only talks to the `log` facade: structural events (like clearing a tree) are
//! logged at `debug`, and every rotation and repair step at `trace`.

use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, TestLogger, WriteLogger};
use std::fs::File;
use std::path::Path;


/// Installs a terminal logger at `level`, plus a file logger when `log_file` is given.
///
/// Fails if some logger was already installed, or the file can't be created.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
    ];
    if let Some(path) = log_file {
        let file = File::create(path).map_err(LoggingError::File)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    CombinedLogger::init(loggers).map_err(LoggingError::AlreadyInstalled)
}

/// Sends everything down to `trace` to the test harness' captured output.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_for_tests() {
    // another test may have installed it first
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

#[non_exhaustive]
#[derive(Debug)]
pub enum LoggingError {
    AlreadyInstalled(SetLoggerError),
    File(std::io::Error),
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInstalled(e) => write!(f, "could not install logger: {e}"),
            Self::File(e) => write!(f, "could not create log file: {e}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AlreadyInstalled(e) => Some(e),
            Self::File(e) => Some(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        init_for_tests();
        log::trace!("logger is up");
        // whichever test got here first owns the global logger
        let err = init(LevelFilter::Warn, None).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInstalled(_)));
        assert!(err.to_string().starts_with("could not install logger"));
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let path = std::env::temp_dir().join("rbtree_map-no-such-dir").join("nested").join("tree.log");
        let err = init(LevelFilter::Info, Some(&path)).unwrap_err();
        assert!(matches!(err, LoggingError::File(_)));
        assert!(err.to_string().starts_with("could not create log file"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
