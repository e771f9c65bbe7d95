//! Core logic for `dly`: append entries to a markdown daily note.
//! This crate owns the merge rules and the durable write protocol.

pub mod config;
pub mod entry;
pub mod logging;
pub mod merge;
pub mod note;
pub mod notify;
pub mod service;
pub mod store;
pub mod writer;

pub use config::{default_config_dir, load_config, Config, ConfigError, ConfigLoad};
pub use entry::{EntryFormat, FormattedEntry};
pub use logging::{init_logging, logging_status, LoggingOptions};
pub use merge::{merge, merge_with_shape, MergeOutcome, TrailingShape};
pub use note::{daily_note_path, read_note, NoteError};
pub use notify::{LogNotifier, Notifier, SilentNotifier};
pub use service::append_service::{AppendError, AppendReport, AppendService, AppendSettings};
pub use store::{FsNoteStore, NoteStore};
pub use writer::{persist, BackupLocations, BackupOutcome, PersistReport, WriteError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
