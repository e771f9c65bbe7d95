//! Release check against the GitHub releases API.
//!
//! # Invariants
//! - Runs on its own thread; the note write never waits on it beyond the
//!   bounded time given to [`ReleaseCheck::wait`].
//! - Every failure is logged at debug level and swallowed.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/wsw70/dly/releases/latest";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Unix seconds of the build, injected at compile time.
const BUILD_TIME: Option<&str> = option_env!("DLY_BUILD_TIME");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub name: String,
    pub published_at: String,
}

#[derive(Debug)]
pub enum UpdateError {
    Http(reqwest::Error),
    Decode(serde_json::Error),
    Timestamp(chrono::ParseError),
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "release request failed: {err}"),
            Self::Decode(err) => write!(f, "cannot decode release payload: {err}"),
            Self::Timestamp(err) => write!(f, "cannot parse release time: {err}"),
        }
    }
}

impl Error for UpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Timestamp(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

impl From<chrono::ParseError> for UpdateError {
    fn from(value: chrono::ParseError) -> Self {
        Self::Timestamp(value)
    }
}

/// Handle on a release check running in the background.
pub struct ReleaseCheck {
    rx: Receiver<Option<Release>>,
}

impl ReleaseCheck {
    /// Waits at most `timeout` for the result; `Some` only when a newer
    /// release exists.
    pub fn wait(self, timeout: Duration) -> Option<Release> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(err) => {
                debug!("release check abandoned: {err}");
                None
            }
        }
    }
}

/// Starts the check, or returns `None` when the build time is unknown.
pub fn spawn_check() -> Option<ReleaseCheck> {
    let build_time = match parse_build_time(BUILD_TIME) {
        Some(build_time) => build_time,
        None => {
            debug!("cannot parse build time, skipping release check");
            return None;
        }
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = match newer_release(build_time) {
            Ok(result) => result,
            Err(err) => {
                debug!("{err}");
                None
            }
        };
        // Receiver may have given up already.
        let _ = tx.send(result);
    });
    Some(ReleaseCheck { rx })
}

fn newer_release(build_time: DateTime<Utc>) -> Result<Option<Release>, UpdateError> {
    let release = fetch_latest()?;
    let published_at = parse_published_at(&release.published_at)?;
    debug!(
        "releases: local {}, GitHub {}",
        build_time.to_rfc3339(),
        published_at.to_rfc3339()
    );
    if build_time < published_at {
        Ok(Some(release))
    } else {
        debug!("no new version");
        Ok(None)
    }
}

fn fetch_latest() -> Result<Release, UpdateError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("dly/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let body = client
        .get(LATEST_RELEASE_URL)
        .send()?
        .error_for_status()?
        .text()?;
    Ok(serde_json::from_str(&body)?)
}

fn parse_build_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let seconds = raw?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

fn parse_published_at(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::{parse_build_time, parse_published_at, Release};

    #[test]
    fn build_time_requires_unix_seconds() {
        assert_eq!(parse_build_time(None), None);
        assert_eq!(parse_build_time(Some("soon")), None);
        assert_eq!(
            parse_build_time(Some("1700000000")).unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn newer_release_compares_after_build() {
        let build = parse_build_time(Some("1700000000")).unwrap();
        let published = parse_published_at("2024-01-02T03:04:05Z").unwrap();
        assert!(build < published);
    }

    #[test]
    fn release_payload_ignores_unknown_fields() {
        let release: Release = serde_json::from_str(
            r#"{"name":"v1.2.0","published_at":"2024-01-02T03:04:05Z","draft":false}"#,
        )
        .unwrap();
        assert_eq!(release.name, "v1.2.0");
    }
}
