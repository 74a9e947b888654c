use serde::{Deserialize, Serialize};

pub mod scorer;

pub use scorer::{Scorer, WeightedRatio};

/// How far candidate windows may grow or shrink around a segment's word count
pub const WINDOW_SWEEP: usize = 5;

/// Timestamped chunk of recognized (or aligned) speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Number of whitespace-delimited tokens in the text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Read position over the tokens of a reference script.
///
/// Tokens before the cursor are consumed and can never be matched again.
#[derive(Debug, Clone)]
pub struct ScriptCursor<'a> {
    tokens: Vec<&'a str>,
    position: usize,
}

impl<'a> ScriptCursor<'a> {
    pub fn new(script: &'a str) -> Self {
        Self {
            tokens: script.split_whitespace().collect(),
            position: 0,
        }
    }

    /// Total number of tokens in the script
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens not yet consumed
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.position
    }

    /// Text of the next `len` tokens, clipped to what remains
    pub fn window(&self, len: usize) -> String {
        let end = self.position + len.min(self.remaining());
        self.tokens[self.position..end].join(" ")
    }

    /// Consume up to `count` tokens
    pub fn advance(&mut self, count: usize) {
        self.position += count.min(self.remaining());
    }
}

/// Candidate window lengths for a segment of `word_count` tokens.
///
/// Yields `n + k` then `n - k` for every `k` in `0..=WINDOW_SWEEP`, clipped to
/// the tokens still available. Lengths that would go below zero become empty
/// windows.
pub fn candidate_lengths(word_count: usize, remaining: usize) -> impl Iterator<Item = usize> {
    (0..=WINDOW_SWEEP)
        .flat_map(move |k| [word_count + k, word_count.saturating_sub(k)])
        .map(move |len| len.min(remaining))
}

/// Greedy aligner that rewrites segment text with the best matching script window
pub struct TranscriptAligner<S = WeightedRatio> {
    scorer: S,
}

impl TranscriptAligner<WeightedRatio> {
    pub fn new() -> Self {
        Self::with_scorer(WeightedRatio)
    }
}

impl Default for TranscriptAligner<WeightedRatio> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scorer> TranscriptAligner<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    /// Align every segment of `transcript` against `script`.
    ///
    /// The output has exactly one segment per input segment, in order, with
    /// the original timestamps. The script is consumed left to right.
    pub fn align(&self, transcript: &[Segment], script: &str) -> Vec<Segment> {
        if transcript.is_empty() {
            return Vec::new();
        }

        let mut cursor = ScriptCursor::new(script);
        tracing::debug!(
            "Aligning {} segments against {} script tokens",
            transcript.len(),
            cursor.len()
        );

        let aligned: Vec<Segment> = transcript
            .iter()
            .map(|segment| self.align_segment(segment, &mut cursor))
            .collect();

        if cursor.remaining() > 0 {
            tracing::debug!("{} script tokens left unmatched", cursor.remaining());
        }

        aligned
    }

    /// Align one segment and advance the cursor past the matched window
    pub fn align_segment(&self, segment: &Segment, cursor: &mut ScriptCursor<'_>) -> Segment {
        let lengths: Vec<usize> = candidate_lengths(segment.word_count(), cursor.remaining()).collect();
        let windows = lengths.iter().map(|&len| cursor.window(len));

        let best = self
            .scorer
            .best_match(&segment.text, windows)
            .map(|(index, score)| (lengths[index], score));

        match best {
            Some((len, score)) if len > 0 => {
                let text = cursor.window(len);
                cursor.advance(len);
                tracing::debug!(
                    "Matched '{}' -> '{}' (score {:.1}, {} tokens left)",
                    segment.text,
                    text,
                    score,
                    cursor.remaining()
                );
                Segment::new(text, segment.start, segment.end)
            }
            _ => {
                tracing::debug!("No script window left for '{}', keeping recognized text", segment.text);
                segment.clone()
            }
        }
    }
}

/// Align a recognized transcript to its script with the default scorer
pub fn align_transcript(transcript: &[Segment], script: &str) -> Vec<Segment> {
    TranscriptAligner::new().align(transcript, script)
}
