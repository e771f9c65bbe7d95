//! Note storage seam.
//!
//! # Responsibility
//! - Define how the append service loads and persists note bytes.
//! - Provide the filesystem implementation used by the CLI.
//!
//! # Invariants
//! - `persist` follows the durable write protocol of `crate::writer`.

use crate::note::{read_note, NoteResult};
use crate::writer::{persist, BackupLocations, PersistReport, WriteError};
use std::path::Path;

/// Storage contract for daily note bytes.
pub trait NoteStore {
    /// Loads current note bytes; a missing note is empty.
    fn load(&self, path: &Path) -> NoteResult<Vec<u8>>;
    /// Durably writes new note bytes.
    fn persist(&self, content: &[u8], path: &Path) -> Result<PersistReport, WriteError>;
}

/// Filesystem-backed store with an injectable backup location list.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    backups: BackupLocations,
}

impl FsNoteStore {
    pub fn new(backups: BackupLocations) -> Self {
        Self { backups }
    }
}

impl NoteStore for FsNoteStore {
    fn load(&self, path: &Path) -> NoteResult<Vec<u8>> {
        read_note(path)
    }

    fn persist(&self, content: &[u8], path: &Path) -> Result<PersistReport, WriteError> {
        persist(content, path, &self.backups)
    }
}
