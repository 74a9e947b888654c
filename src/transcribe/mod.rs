use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::align::{Scorer, Segment, TranscriptAligner, WeightedRatio};
use crate::captions::WordEntry;
use crate::config::AudioConfig;
use crate::Result;

pub mod command;
pub mod words;

pub use command::CommandRecognizer;
pub use words::flatten_words;

/// Coarse recognizer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Timestamped segments, possibly mis-recognized
    pub segments: Vec<Segment>,

    /// Detected language code
    pub language: String,
}

/// Word from the fine-grained realignment, timestamps not always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub word: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl TimedWord {
    pub fn timed(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn untimed(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            start: None,
            end: None,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Segment returned by the realigner, broken down into words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealignedSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub words: Vec<TimedWord>,
}

/// Recognizer settings passed through to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOptions {
    pub model: String,
    pub device: String,
    pub batch_size: usize,
    pub compute_type: String,
    pub language: String,
}

impl From<&AudioConfig> for RecognitionOptions {
    fn from(audio: &AudioConfig) -> Self {
        Self {
            model: audio.model.clone(),
            device: audio.device.clone(),
            batch_size: audio.batch_size,
            compute_type: audio.compute_type.clone(),
            language: audio.language.clone(),
        }
    }
}

/// External speech recognizer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Transcribe an audio file into coarse segments
    async fn transcribe(&self, audio: &Path, options: &RecognitionOptions) -> Result<Recognition>;

    /// Re-align corrected segments against the audio at word level
    async fn realign(
        &self,
        segments: &[Segment],
        audio: &Path,
        language: &str,
    ) -> Result<Vec<RealignedSegment>>;
}

/// Recognize, align to the script, realign and flatten into a word transcript
pub struct TranscriptionPipeline<R, S = WeightedRatio> {
    recognizer: R,
    aligner: TranscriptAligner<S>,
    options: RecognitionOptions,
    quiet: bool,
}

impl<R: Recognizer> TranscriptionPipeline<R> {
    pub fn new(recognizer: R, options: RecognitionOptions) -> Self {
        Self::with_aligner(recognizer, TranscriptAligner::new(), options)
    }
}

impl<R: Recognizer, S: Scorer> TranscriptionPipeline<R, S> {
    pub fn with_aligner(recognizer: R, aligner: TranscriptAligner<S>, options: RecognitionOptions) -> Self {
        Self {
            recognizer,
            aligner,
            options,
            quiet: false,
        }
    }

    /// Hide the progress spinner
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the whole transcription stage for one audio file and its script
    pub async fn run(&self, audio: &Path, script: &str) -> Result<Vec<WordEntry>> {
        let progress = if self.quiet { ProgressBar::hidden() } else { spinner() };

        progress.set_message(format!("Transcribing {}...", audio.display()));
        let recognition = self.recognizer.transcribe(audio, &self.options).await?;
        tracing::info!(
            "Recognized {} segments (language: {})",
            recognition.segments.len(),
            recognition.language
        );
        tracing::debug!("Before alignment: {:?}", recognition.segments);

        let aligned = self.aligner.align(&recognition.segments, script);

        progress.set_message("Aligning words...");
        let realigned = self
            .recognizer
            .realign(&aligned, audio, &recognition.language)
            .await?;
        tracing::debug!("After alignment: {:?}", realigned);

        let words = flatten_words(&realigned);
        progress.finish_with_message(format!("Transcript ready ({} words)", words.len()));

        Ok(words)
    }
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RecognitionOptions {
        RecognitionOptions {
            model: "large-v2".to_string(),
            device: "cpu".to_string(),
            batch_size: 8,
            compute_type: "int8".to_string(),
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pipeline_realigns_script_text() {
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_transcribe()
            .withf(|audio, options| audio.as_os_str() == "story.wav" && options.model == "large-v2")
            .times(1)
            .returning(|_, _| {
                Ok(Recognition {
                    segments: vec![Segment::new("helo wrld", 0.0, 1.0)],
                    language: "en".to_string(),
                })
            });
        recognizer
            .expect_realign()
            .withf(|segments, _, language| {
                segments.len() == 1 && segments[0].text == "hello world" && language.to_string() == "en"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![RealignedSegment {
                    text: Some("hello world".to_string()),
                    words: vec![TimedWord::untimed("hello"), TimedWord::timed("world", 0.5, 1.0)],
                }])
            });

        let pipeline = TranscriptionPipeline::new(recognizer, options());
        let words = pipeline.run(Path::new("story.wav"), "hello world").await.unwrap();

        assert_eq!(
            words,
            vec![WordEntry::new("hello", 0.0, 0.5), WordEntry::new("world", 0.5, 1.0)]
        );
    }

    #[tokio::test]
    async fn test_pipeline_propagates_recognizer_failure() {
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_transcribe()
            .returning(|_, _| Err(anyhow::anyhow!("model failed to load")));
        recognizer.expect_realign().never();

        let pipeline = TranscriptionPipeline::new(recognizer, options());
        let err = pipeline.run(Path::new("story.wav"), "hello").await.unwrap_err();

        assert_eq!(err.to_string(), "model failed to load");
    }

    #[test]
    fn test_timed_word_deserializes_missing_timestamps() {
        let word: TimedWord = serde_json::from_str(r#"{"word": "hello"}"#).unwrap();
        assert_eq!(word, TimedWord::untimed("hello"));
        assert!(!word.is_timed());
    }
}
