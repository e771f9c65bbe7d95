//! Note content merge engine.
//!
//! # Responsibility
//! - Splice one formatted entry into the current bytes of a daily note.
//! - Keep the note valid markdown: the entry always lands as a list item on
//!   its own line.
//!
//! # Invariants
//! - Merging never fails; any byte sequence (including empty) is accepted.
//! - Only the last byte of the existing note is inspected. Nothing is
//!   trimmed, reflowed or validated.
//! - Every merge result ends with `\n` when the entry is single-line, so a
//!   second merge on the result always classifies as [`TrailingShape::LineEnd`].
//!
//! # See also
//! - `crate::entry` for how the entry text is built.

/// Markdown bullet marker placed in front of a new entry.
const BULLET: &[u8] = b"- ";

/// Closed set of trailing shapes the engine distinguishes.
///
/// Variants are listed in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingShape {
    /// Note has no content yet.
    Empty,
    /// Last line is terminated; a fresh bullet can start right away.
    LineEnd,
    /// Note ends with a bare `-`, an unfinished bullet left behind by an
    /// interrupted edit. It is completed in place.
    ///
    /// This is a heuristic: a line legitimately ending in `-` is treated the
    /// same way.
    OpenBullet,
    /// Note ends mid-line; a line break is forced before the new bullet.
    Unterminated,
}

impl TrailingShape {
    /// Classifies note bytes by their last byte.
    pub fn classify(existing: &[u8]) -> Self {
        match existing.last() {
            None => Self::Empty,
            Some(b'\n') => Self::LineEnd,
            Some(b'-') => Self::OpenBullet,
            Some(_) => Self::Unterminated,
        }
    }

    /// Bytes inserted between the existing note and the entry text.
    fn joiner(self) -> &'static [u8] {
        match self {
            Self::Empty | Self::LineEnd => BULLET,
            Self::OpenBullet => b" ",
            Self::Unterminated => b"\n- ",
        }
    }

    /// Stable lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::LineEnd => "line_end",
            Self::OpenBullet => "open_bullet",
            Self::Unterminated => "unterminated",
        }
    }
}

/// Merge result together with the case that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Trailing shape of the note before merging.
    pub shape: TrailingShape,
    /// Full new note contents.
    pub content: Vec<u8>,
}

/// Merges `entry` into `existing` and reports which case applied.
pub fn merge_with_shape(existing: &[u8], entry: &str) -> MergeOutcome {
    let shape = TrailingShape::classify(existing);
    let joiner = shape.joiner();

    let mut content = Vec::with_capacity(existing.len() + joiner.len() + entry.len() + 1);
    content.extend_from_slice(existing);
    content.extend_from_slice(joiner);
    content.extend_from_slice(entry.as_bytes());
    content.push(b'\n');

    MergeOutcome { shape, content }
}

/// Merges `entry` into `existing`, returning the new note bytes.
pub fn merge(existing: &[u8], entry: &str) -> Vec<u8> {
    merge_with_shape(existing, entry).content
}

#[cfg(test)]
mod tests {
    use super::{merge, merge_with_shape, TrailingShape};

    #[test]
    fn classify_follows_priority_order() {
        assert_eq!(TrailingShape::classify(b""), TrailingShape::Empty);
        assert_eq!(TrailingShape::classify(b"-\n"), TrailingShape::LineEnd);
        assert_eq!(TrailingShape::classify(b"\n-"), TrailingShape::OpenBullet);
        assert_eq!(TrailingShape::classify(b"- x"), TrailingShape::Unterminated);
    }

    #[test]
    fn crlf_note_counts_as_line_end() {
        assert_eq!(
            merge(b"- earlier\r\n", "second"),
            b"- earlier\r\n- second\n".to_vec()
        );
    }

    #[test]
    fn whitespace_only_note_is_not_trimmed() {
        let outcome = merge_with_shape(b"   ", "entry");
        assert_eq!(outcome.shape, TrailingShape::Unterminated);
        assert_eq!(outcome.content, b"   \n- entry\n".to_vec());
    }

    #[test]
    fn word_ending_in_dash_is_completed_in_place() {
        assert_eq!(merge(b"well-", "known"), b"well- known\n".to_vec());
    }
}
