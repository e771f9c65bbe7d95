//! Append use-case service.
//!
//! # Responsibility
//! - Append one user entry to today's daily note.
//! - Report backup problems as advisory and target write problems as fatal.
//!
//! # Invariants
//! - Steps run strictly in order: resolve path, load, format, merge, persist,
//!   notify.
//! - The notifier is only called after the note was durably written.
//! - Blank user text is rejected before any file is touched.

use crate::config::Config;
use crate::entry::{EntryFormat, FormattedEntry};
use crate::merge::{merge_with_shape, TrailingShape};
use crate::note::{daily_note_path, NoteError};
use crate::notify::Notifier;
use crate::store::NoteStore;
use crate::writer::{BackupOutcome, PersistReport, WriteError};
use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

/// Service error for the append use-case.
#[derive(Debug)]
pub enum AppendError {
    /// User text is empty or whitespace only.
    EmptyEntry,
    /// Filename date pattern cannot be rendered.
    InvalidFilenameFormat(String),
    /// Existing note could not be loaded.
    Load(NoteError),
    /// Authoritative note write failed.
    Write(WriteError),
}

impl Display for AppendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEntry => write!(f, "nothing to add: entry text is empty"),
            Self::InvalidFilenameFormat(value) => {
                write!(f, "invalid filename format: `{value}`")
            }
            Self::Load(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Write(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteError> for AppendError {
    fn from(value: NoteError) -> Self {
        Self::Load(value)
    }
}

impl From<WriteError> for AppendError {
    fn from(value: WriteError) -> Self {
        Self::Write(value)
    }
}

/// Where and how entries are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendSettings {
    pub notes_dir: PathBuf,
    /// chrono strftime pattern for the note file stem.
    pub filename_format: String,
    pub entry_format: EntryFormat,
}

impl AppendSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            notes_dir: config.daily_notes_path.clone(),
            filename_format: config.filename_format.clone(),
            entry_format: config.entry_format(),
        }
    }
}

/// Result of one successful append.
#[derive(Debug)]
pub struct AppendReport {
    /// Today's note path.
    pub path: PathBuf,
    /// Entry text as merged.
    pub entry: FormattedEntry,
    /// Trailing shape of the note before the merge.
    pub shape: TrailingShape,
    pub persist: PersistReport,
}

/// Append service facade over a note store and a notifier.
pub struct AppendService<S: NoteStore, N: Notifier> {
    store: S,
    notifier: N,
    settings: AppendSettings,
}

impl<S: NoteStore, N: Notifier> AppendService<S, N> {
    pub fn new(store: S, notifier: N, settings: AppendSettings) -> Self {
        Self {
            store,
            notifier,
            settings,
        }
    }

    /// Resolves the daily note path for `now`.
    pub fn note_path(&self, now: NaiveDateTime) -> Result<PathBuf, AppendError> {
        daily_note_path(
            &self.settings.notes_dir,
            now,
            &self.settings.filename_format,
        )
        .ok_or_else(|| AppendError::InvalidFilenameFormat(self.settings.filename_format.clone()))
    }

    /// Appends `text` to the note of `now`'s date.
    pub fn append(&self, text: &str, now: NaiveDateTime) -> Result<AppendReport, AppendError> {
        let started_at = Instant::now();
        if text.trim().is_empty() {
            warn!("event=note_append module=service status=rejected reason=empty_entry");
            return Err(AppendError::EmptyEntry);
        }

        let path = match self.note_path(now) {
            Ok(path) => path,
            Err(err) => {
                error!("event=note_path module=service status=error error={err}");
                return Err(err);
            }
        };
        let existing = match self.store.load(&path) {
            Ok(existing) => existing,
            Err(err) => {
                error!(
                    "event=note_load module=service status=error error_code=note_read_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };
        if existing.is_empty() {
            info!("no note for today, will create one");
        }
        debug!(
            "event=note_load module=service status=ok path={} bytes={}",
            path.display(),
            existing.len()
        );

        let entry = self.settings.entry_format.format(text, now.time());
        let outcome = merge_with_shape(&existing, entry.as_str());
        debug!(
            "event=note_merge module=service status=ok shape={} bytes={}",
            outcome.shape.as_str(),
            outcome.content.len()
        );

        let persist = match self.store.persist(&outcome.content, &path) {
            Ok(report) => report,
            Err(err) => {
                log_backup(err.backup());
                error!(
                    "event=note_write module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        log_backup(&persist.backup);
        info!(
            "event=note_write module=service status=ok duration_ms={} bytes={}",
            started_at.elapsed().as_millis(),
            persist.bytes_written
        );
        info!("note {} updated", path.display());

        self.notifier.note_added(&path);

        Ok(AppendReport {
            path,
            entry,
            shape: outcome.shape,
            persist,
        })
    }
}

fn log_backup(outcome: &BackupOutcome) {
    match outcome {
        BackupOutcome::Written(path) => debug!("backup note is {}", path.display()),
        BackupOutcome::WriteFailed { path, error } => error!(
            "could not write the backup file {}: {error}",
            path.display()
        ),
        BackupOutcome::Unavailable { attempts } => {
            for attempt in attempts {
                debug!(
                    "cannot create temporary file {}: {}",
                    attempt.path.display(),
                    attempt.error
                );
            }
            error!("cannot find a place to put the backup, skipping it");
        }
    }
}
