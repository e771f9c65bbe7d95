//! Durable note writer.
//!
//! # Responsibility
//! - Write a best-effort backup copy of the new note contents to a scratch
//!   directory.
//! - Then overwrite the authoritative note file.
//!
//! # Invariants
//! - The backup is attempted before the target is truncated.
//! - Backup failures are reported in [`PersistReport`] and never prevent the
//!   target write.
//! - Every file handle is closed before `persist` returns, on all paths.
//! - Target creation/write failures are returned as [`WriteError`].
//!
//! The target is truncated then written in place; no atomic rename is used, so
//! a crash mid-write can leave a truncated note.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Ordered list of candidate directories for the backup copy.
///
/// The first directory where the backup file can be created wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackupLocations {
    candidates: Vec<PathBuf>,
}

impl BackupLocations {
    /// Builds locations from an explicit ordered list. Duplicates are dropped,
    /// keeping the first occurrence.
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut unique: Vec<PathBuf> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        Self { candidates: unique }
    }

    /// No backup location at all; the backup step is skipped.
    pub fn none() -> Self {
        Self::default()
    }

    /// Conventional scratch directories for the current platform, followed by
    /// the OS temp directory.
    pub fn platform_default() -> Self {
        let conventional = if cfg!(windows) {
            PathBuf::from(r"C:\TEMP")
        } else {
            PathBuf::from("/tmp")
        };
        Self::new([conventional, std::env::temp_dir()])
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

/// One failed attempt at creating a backup file.
#[derive(Debug)]
pub struct BackupAttempt {
    pub path: PathBuf,
    pub error: io::Error,
}

/// What happened to the backup copy.
#[derive(Debug)]
pub enum BackupOutcome {
    /// Backup fully written.
    Written(PathBuf),
    /// Backup file was created but writing to it failed.
    WriteFailed { path: PathBuf, error: io::Error },
    /// No candidate directory accepted the backup file.
    Unavailable { attempts: Vec<BackupAttempt> },
}

impl BackupOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Result of a successful persist call.
#[derive(Debug)]
pub struct PersistReport {
    /// Authoritative note path that was written.
    pub target: PathBuf,
    /// Advisory backup result.
    pub backup: BackupOutcome,
    /// Number of bytes written to the target.
    pub bytes_written: usize,
}

/// Fatal failure of the authoritative write.
#[derive(Debug)]
pub enum WriteError {
    /// Target could not be created or truncated.
    CreateTarget {
        path: PathBuf,
        source: io::Error,
        backup: BackupOutcome,
    },
    /// Target was truncated but writing the content failed.
    WriteTarget {
        path: PathBuf,
        source: io::Error,
        backup: BackupOutcome,
    },
}

impl WriteError {
    /// Backup result recorded before the target write failed.
    pub fn backup(&self) -> &BackupOutcome {
        match self {
            Self::CreateTarget { backup, .. } | Self::WriteTarget { backup, .. } => backup,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::CreateTarget { path, .. } | Self::WriteTarget { path, .. } => path,
        }
    }
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateTarget { path, source, .. } => {
                write!(f, "could not open the note {}: {source}", path.display())
            }
            Self::WriteTarget { path, source, .. } => {
                write!(f, "could not write the note {}: {source}", path.display())
            }
        }
    }
}

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateTarget { source, .. } | Self::WriteTarget { source, .. } => Some(source),
        }
    }
}

/// Writes `content` to a backup location, then to `target`.
pub fn persist(
    content: &[u8],
    target: &Path,
    locations: &BackupLocations,
) -> Result<PersistReport, WriteError> {
    let backup = write_backup(content, target, locations);

    let mut file = match File::create(target) {
        Ok(file) => file,
        Err(source) => {
            return Err(WriteError::CreateTarget {
                path: target.to_path_buf(),
                source,
                backup,
            })
        }
    };

    if let Err(source) = file.write_all(content).and_then(|()| file.flush()) {
        return Err(WriteError::WriteTarget {
            path: target.to_path_buf(),
            source,
            backup,
        });
    }

    Ok(PersistReport {
        target: target.to_path_buf(),
        backup,
        bytes_written: content.len(),
    })
}

fn write_backup(content: &[u8], target: &Path, locations: &BackupLocations) -> BackupOutcome {
    let Some(file_name) = target.file_name() else {
        return BackupOutcome::Unavailable {
            attempts: Vec::new(),
        };
    };

    let mut attempts = Vec::new();
    for dir in locations.candidates() {
        let path = dir.join(file_name);
        match File::create(&path) {
            Ok(mut file) => {
                return match file.write_all(content).and_then(|()| file.flush()) {
                    Ok(()) => BackupOutcome::Written(path),
                    Err(error) => BackupOutcome::WriteFailed { path, error },
                };
            }
            Err(error) => attempts.push(BackupAttempt { path, error }),
        }
    }

    BackupOutcome::Unavailable { attempts }
}

#[cfg(test)]
mod tests {
    use super::BackupLocations;
    use std::path::PathBuf;

    #[test]
    fn locations_keep_first_occurrence_order() {
        let locations = BackupLocations::new(["/a", "/b", "/a", "/c"]);
        assert_eq!(
            locations.candidates(),
            &[
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c")
            ]
        );
    }

    #[test]
    fn platform_default_includes_os_temp_dir() {
        let locations = BackupLocations::platform_default();
        assert!(locations.candidates().contains(&std::env::temp_dir()));
    }
}
