use super::{RealignedSegment, TimedWord};
use crate::captions::WordEntry;

/// Flatten realigned segments into one word transcript.
///
/// Words missing timestamps are filled from their neighbours within the same
/// segment: a missing start takes the previous word's end (0 for the first
/// word), a missing end takes the next word's start, then the segment's last
/// start, then the word's own start.
pub fn flatten_words(segments: &[RealignedSegment]) -> Vec<WordEntry> {
    let mut entries = Vec::new();
    let mut backfilled = 0;

    for segment in segments {
        backfilled += segment.words.iter().filter(|w| !w.is_timed()).count();
        entries.extend(backfill_segment(&segment.words));
    }

    if backfilled > 0 {
        tracing::debug!("Backfilled timestamps for {} words", backfilled);
    }

    entries
}

fn backfill_segment(words: &[TimedWord]) -> Vec<WordEntry> {
    let last_start = words.last().and_then(|w| w.start);
    let mut resolved: Vec<WordEntry> = Vec::with_capacity(words.len());

    for (index, word) in words.iter().enumerate() {
        let start = word
            .start
            .or_else(|| resolved.last().map(|previous| previous.end))
            .unwrap_or(0.0);

        let end = word
            .end
            .or_else(|| words.get(index + 1).and_then(|next| next.start))
            .or(last_start)
            .unwrap_or(start);

        resolved.push(WordEntry::new(word.word.clone(), start, end));
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(words: Vec<TimedWord>) -> RealignedSegment {
        RealignedSegment { text: None, words }
    }

    #[test]
    fn test_flatten_keeps_order_across_segments() {
        let segments = vec![
            segment(vec![TimedWord::timed("hello", 0.0, 0.5)]),
            segment(vec![TimedWord::timed("world", 0.5, 1.0)]),
        ];
        let words = flatten_words(&segments);

        assert_eq!(words.len(), 2);
        assert_eq!(words[0], WordEntry::new("hello", 0.0, 0.5));
        assert_eq!(words[1], WordEntry::new("world", 0.5, 1.0));
    }

    #[test]
    fn test_missing_first_word_timestamps() {
        let segments = vec![segment(vec![
            TimedWord::untimed("hello"),
            TimedWord::timed("world", 0.5, 1.0),
        ])];
        let words = flatten_words(&segments);

        assert_eq!(words[0], WordEntry::new("hello", 0.0, 0.5));
        assert_eq!(words[1], WordEntry::new("world", 0.5, 1.0));
    }

    #[test]
    fn test_missing_middle_word_uses_neighbours() {
        let segments = vec![segment(vec![
            TimedWord::timed("one", 1.0, 1.4),
            TimedWord::untimed("2"),
            TimedWord::timed("three", 1.9, 2.3),
        ])];
        let words = flatten_words(&segments);

        assert_eq!(words[1], WordEntry::new("2", 1.4, 1.9));
    }

    #[test]
    fn test_missing_last_word_falls_back() {
        let segments = vec![segment(vec![
            TimedWord::timed("one", 1.0, 1.4),
            TimedWord::untimed("%"),
        ])];
        let words = flatten_words(&segments);

        assert_eq!(words[1].start, 1.4);
        assert_eq!(words[1].end, 1.4);
    }
}
