//! Notification hooks.
//!
//! Desktop popups are not implemented; [`LogNotifier`] reports through the
//! log instead.

use log::warn;
use std::path::Path;

/// Project release page announced on new versions.
pub const RELEASES_URL: &str = "https://github.com/wsw70/dly/releases/latest";

/// Receives user-facing notifications.
pub trait Notifier {
    /// Called after the note was durably written.
    fn note_added(&self, path: &Path);
    /// Called when a newer release is published.
    fn new_version(&self, name: &str);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn note_added(&self, path: &Path) {
        (**self).note_added(path);
    }

    fn new_version(&self, name: &str) {
        (**self).new_version(name);
    }
}

/// Returns the log notifier when `enabled`, the silent one otherwise.
pub fn notifier_for(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(LogNotifier)
    } else {
        Box::new(SilentNotifier)
    }
}

/// Notifier writing to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn note_added(&self, path: &Path) {
        warn!(
            "event=notify module=notify status=unsupported kind=note_added path={}",
            path.display()
        );
    }

    fn new_version(&self, name: &str) {
        warn!("event=notify module=notify status=unsupported kind=new_version name={name}");
    }
}

/// Notifier that drops everything; used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn note_added(&self, _path: &Path) {}

    fn new_version(&self, _name: &str) {}
}
