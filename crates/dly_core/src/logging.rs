//! Logging bootstrap.
//!
//! # Responsibility
//! - Initialize console logging (stderr) exactly once per process.
//! - Optionally mirror logs to rotated files when a log directory is given.
//! - Derive the level from `DLY_DEBUG`.
//!
//! # Invariants
//! - Logging init is idempotent for identical options.
//! - Re-initialization with a different level or directory is rejected.
//! - Logging initialization must not panic.

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{debug, error, Record};
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `DLY_DEBUG=yes` switches the level to `debug`.
pub const DEBUG_ENV: &str = "DLY_DEBUG";
/// Directory for optional rotated log files.
pub const LOG_DIR_ENV: &str = "DLY_LOG_DIR";

const LOG_FILE_BASENAME: &str = "dly";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    options: LoggingOptions,
    _logger: LoggerHandle,
}

/// Normalized logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    pub level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl LoggingOptions {
    /// Builds options from a level string and an optional absolute directory.
    ///
    /// # Errors
    /// - Unsupported level.
    /// - Empty or relative log directory.
    pub fn new(level: &str, log_dir: Option<&Path>) -> Result<Self, String> {
        Ok(Self {
            level: normalize_level(level)?,
            log_dir: log_dir.map(normalize_log_dir).transpose()?,
        })
    }

    /// Options derived from `DLY_DEBUG` and `DLY_LOG_DIR`.
    pub fn from_env() -> Result<Self, String> {
        let level = level_from_debug_flag(std::env::var(DEBUG_ENV).ok().as_deref());
        let log_dir = std::env::var_os(LOG_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(level, log_dir.as_deref())
    }
}

/// Maps the `DLY_DEBUG` value to a level: only `yes` enables debug output.
pub fn level_from_debug_flag(flag: Option<&str>) -> &'static str {
    match flag {
        Some("yes") => "debug",
        _ => "info",
    }
}

/// Initializes logging.
///
/// # Errors
/// - Logging already active with different options.
/// - Log directory cannot be created.
/// - Logger backend setup fails.
pub fn init_logging(options: &LoggingOptions) -> Result<(), String> {
    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = start_logger(options)?;
        install_panic_hook_once();

        debug!(
            "debugging initialized, version {} {}/{}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        Ok(LoggingState {
            options: options.clone(),
            _logger: logger,
        })
    })?;

    if state.options != *options {
        return Err(format!(
            "logging already initialized with {:?}; refusing to switch to {:?}",
            state.options, options
        ));
    }
    Ok(())
}

/// Returns active logging options, `None` before initialization.
pub fn logging_status() -> Option<LoggingOptions> {
    LOGGING_STATE.get().map(|state| state.options.clone())
}

fn start_logger(options: &LoggingOptions) -> Result<LoggerHandle, String> {
    let logger = Logger::try_with_str(options.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", options.level))?
        .format_for_stderr(console_format);

    let logger = match &options.log_dir {
        None => logger.log_to_stderr(),
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .duplicate_to_stderr(Duplicate::All)
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}

/// `2024-03-07T09:05:00+01:00 INFO message`
fn console_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%dT%H:%M:%S%:z"),
        record.level(),
        record.args()
    )
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload may echo user text; keep it on one capped line.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, level_from_debug_flag, logging_status, normalize_level, sanitize_message,
        LoggingOptions,
    };
    use std::path::Path;

    #[test]
    fn debug_flag_requires_exact_yes() {
        assert_eq!(level_from_debug_flag(Some("yes")), "debug");
        assert_eq!(level_from_debug_flag(Some("true")), "info");
        assert_eq!(level_from_debug_flag(None), "info");
    }

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let error = LoggingOptions::new("info", Some(Path::new("logs/dev")))
            .expect_err("relative paths must be rejected");
        assert!(error.contains("absolute"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let log_dir = tempfile::tempdir().unwrap();
        let options = LoggingOptions::new("info", Some(log_dir.path())).unwrap();

        init_logging(&options).expect("first init should succeed");
        init_logging(&options).expect("same options should be idempotent");

        let conflicting = LoggingOptions::new("debug", Some(log_dir.path())).unwrap();
        let error = init_logging(&conflicting).expect_err("level conflict should fail");
        assert!(error.contains("refusing to switch"));

        assert_eq!(logging_status(), Some(options));
    }
}
