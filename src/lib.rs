//! Shorts Scribe - transcript alignment core for a short-video maker
//!
//! Takes a story post, turns it into a narration script, corrects the speech
//! recognizer's transcript of the narration against that script and groups the
//! timed words into word and sentence captions.

pub mod align;
pub mod captions;
pub mod cli;
pub mod config;
pub mod output;
pub mod script;
pub mod sources;
pub mod transcribe;
pub mod utils;

pub use align::{align_transcript, Segment, TranscriptAligner};
pub use captions::{build_captions, Captions, WordEntry};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use sources::{Post, PostSource, SourceRegistry};
pub use transcribe::{Recognizer, TranscriptionPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the scribe
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("No post source found for: {0}")]
    UnsupportedSource(String),

    #[error("Recognizer program not available: {0}")]
    RecognizerUnavailable(String),
}
