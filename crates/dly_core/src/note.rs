//! Daily note location and loading.
//!
//! # Responsibility
//! - Resolve today's note path from the notes directory and a date pattern.
//! - Load the current note bytes, treating a missing file as an empty note.
//!
//! # Invariants
//! - Note bytes are read raw; no decoding or line-ending normalization.
//! - Only "not found" maps to an empty note; every other I/O error is
//!   surfaced.

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter, Write};
use std::io;
use std::path::{Path, PathBuf};

/// File extension of daily notes.
pub const NOTE_EXTENSION: &str = "md";

pub type NoteResult<T> = Result<T, NoteError>;

#[derive(Debug)]
pub enum NoteError {
    /// Existing note could not be read.
    Read { path: PathBuf, source: io::Error },
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read today's note {}: {source}", path.display())
            }
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
        }
    }
}

/// Returns whether `pattern` renders as a file stem.
///
/// Offset specifiers (`%z`, `%Z`, ...) are rejected: notes are named from
/// local wall-clock time, which carries no offset.
pub fn is_valid_filename_pattern(pattern: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0));
    sample.is_some_and(|sample| render_stem(sample, pattern).is_some())
}

/// Builds `<notes_dir>/<now formatted with pattern>.md`.
///
/// Returns `None` when the pattern is empty or cannot be rendered.
pub fn daily_note_path(notes_dir: &Path, now: NaiveDateTime, pattern: &str) -> Option<PathBuf> {
    let stem = render_stem(now, pattern)?;
    Some(notes_dir.join(format!("{stem}.{NOTE_EXTENSION}")))
}

fn render_stem(now: NaiveDateTime, pattern: &str) -> Option<String> {
    if pattern.trim().is_empty() {
        return None;
    }
    let mut stem = String::new();
    write!(stem, "{}", now.format(pattern)).ok()?;
    Some(stem)
}

/// Reads note bytes at `path`; a missing file yields an empty buffer.
pub fn read_note(path: &Path) -> NoteResult<Vec<u8>> {
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(NoteError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
