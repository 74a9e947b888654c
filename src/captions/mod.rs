use serde::{Deserialize, Serialize};

/// Characters that close a sentence when they end a word
pub const SENTENCE_TERMINATORS: [char; 6] = ['.', ';', ':', '!', '?', ','];

/// Ellipsis token, never treated as a sentence terminator
pub const ELLIPSIS: &str = "...";

/// Words lasting this long (seconds) or longer are recognition artifacts
pub const MAX_WORD_DURATION: f64 = 5.0;

/// Single recognized word with resolved timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Growing caption: the sentence accumulated up to and including one word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCaption {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Full sentence caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceCaption {
    pub sentence: String,
    pub start: f64,
    pub end: f64,
}

/// Word that could not be inspected for a sentence boundary
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MalformedWord {
    #[error("word {index} is empty")]
    Empty { index: usize },
}

/// Caption data handed to the video compositor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Captions {
    /// Progressive word-by-word captions
    pub words: Vec<WordCaption>,

    /// Sentence-level captions
    pub sentences: Vec<SentenceCaption>,

    /// Words skipped during boundary detection
    #[serde(skip)]
    pub skipped: Vec<MalformedWord>,
}

/// Stretch every word's end to the next word's start, leaving the last one as is
pub fn close_gaps(words: &mut [WordEntry]) {
    for i in 1..words.len() {
        words[i - 1].end = words[i].start;
    }
}

/// Drop words that start at zero or last implausibly long
pub fn filter_transcript(words: Vec<WordEntry>) -> Vec<WordEntry> {
    let before = words.len();
    let kept: Vec<WordEntry> = words
        .into_iter()
        .filter(|w| w.start != 0.0 && w.duration() < MAX_WORD_DURATION)
        .collect();

    if kept.len() != before {
        tracing::info!("Filtered out {} suspicious words", before - kept.len());
    }
    kept
}

/// Whether `word` closes a sentence
fn ends_sentence(word: &str, index: usize) -> Result<bool, MalformedWord> {
    let last = word.chars().last().ok_or(MalformedWord::Empty { index })?;
    Ok(SENTENCE_TERMINATORS.contains(&last) && word != ELLIPSIS)
}

/// Group words into progressive word captions and sentence captions in one forward pass
pub fn group_words_and_sentences(words: &[WordEntry]) -> Captions {
    let mut captions = Captions::default();

    let mut sentence = String::new();
    let mut sentence_start = 0.0;
    let mut sentence_end = 0.0;
    let mut word_start = 0.0;

    for (index, entry) in words.iter().enumerate() {
        let word = entry.word.trim();
        sentence.push_str(word);
        sentence.push(' ');

        captions.words.push(WordCaption {
            word: sentence.clone(),
            start: word_start,
            end: entry.end,
        });
        word_start = entry.end;

        match ends_sentence(word, index) {
            Ok(true) => {
                sentence_end = entry.end;
                captions.sentences.push(SentenceCaption {
                    sentence: std::mem::take(&mut sentence),
                    start: sentence_start,
                    end: sentence_end,
                });
                sentence_start = sentence_end;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Error processing word '{}': {}", entry.word, e);
                captions.skipped.push(e);
            }
        }
    }

    // Flush whatever did not end on punctuation
    if !sentence.is_empty() {
        captions.sentences.push(SentenceCaption {
            sentence,
            start: sentence_start,
            end: sentence_end,
        });
    }

    captions
}

/// Full caption preparation: optional filtering, gap closing, then grouping
pub fn build_captions(mut words: Vec<WordEntry>, filter: bool) -> Captions {
    if filter {
        words = filter_transcript(words);
    }
    close_gaps(&mut words);

    let captions = group_words_and_sentences(&words);
    tracing::info!(
        "Built {} word captions and {} sentence captions",
        captions.words.len(),
        captions.sentences.len()
    );
    captions
}
