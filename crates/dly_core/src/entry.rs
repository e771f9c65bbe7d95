//! Entry formatting.
//!
//! # Responsibility
//! - Turn raw user text into the single-line string handed to the merge
//!   engine.
//!
//! # Invariants
//! - A formatted entry never contains `\r` or `\n`.
//! - Raw text always receives one trailing space; a configured hashtag is
//!   appended right after it, so text and tag are separated by one space.
//! - An empty hashtag means "no hashtag", never a literal `#`.

use chrono::NaiveTime;

/// Single-line entry text ready to be merged into a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEntry(String);

impl FormattedEntry {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Formatting options resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryFormat {
    /// Prefix entries with `**HH:MM** `.
    pub add_timestamp: bool,
    /// Normalized tag without `#`, `None` when disabled.
    pub hashtag: Option<String>,
}

impl EntryFormat {
    /// Builds a format, normalizing the hashtag with [`normalize_hashtag`].
    pub fn new(add_timestamp: bool, hashtag: Option<&str>) -> Self {
        Self {
            add_timestamp,
            hashtag: hashtag.and_then(normalize_hashtag),
        }
    }

    /// Formats `raw` as an entry written at `time`.
    pub fn format(&self, raw: &str, time: NaiveTime) -> FormattedEntry {
        let mut text = String::with_capacity(raw.len() + 24);
        if self.add_timestamp {
            text.push_str(&format!("**{}** ", time.format("%H:%M")));
        }
        text.extend(raw.chars().map(|ch| match ch {
            '\r' | '\n' => ' ',
            other => other,
        }));
        text.push(' ');
        if let Some(tag) = &self.hashtag {
            text.push('#');
            text.push_str(tag);
        }
        FormattedEntry(text)
    }
}

/// Strips whitespace and leading `#` from a configured tag.
///
/// Returns `None` when nothing is left.
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_hashtag, EntryFormat};
    use chrono::NaiveTime;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn plain_entry_keeps_trailing_space() {
        let format = EntryFormat::new(false, None);
        assert_eq!(format.format("hello", at(9, 5)).as_str(), "hello ");
    }

    #[test]
    fn timestamp_is_zero_padded_24h() {
        let format = EntryFormat::new(true, None);
        assert_eq!(format.format("late", at(21, 7)).as_str(), "**21:07** late ");
        assert_eq!(format.format("early", at(0, 0)).as_str(), "**00:00** early ");
    }

    #[test]
    fn hashtag_follows_single_space() {
        let format = EntryFormat::new(true, Some("work"));
        assert_eq!(
            format.format("standup done", at(9, 5)).as_str(),
            "**09:05** standup done #work"
        );
    }

    #[test]
    fn newlines_are_flattened() {
        let format = EntryFormat::new(false, None);
        assert_eq!(format.format("a\r\nb", at(9, 5)).as_str(), "a  b ");
    }

    #[test]
    fn normalize_hashtag_handles_prefix_and_blank() {
        assert_eq!(normalize_hashtag(" #todo "), Some("todo".to_string()));
        assert_eq!(normalize_hashtag("##"), None);
        assert_eq!(normalize_hashtag("   "), None);
    }
}
