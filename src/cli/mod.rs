use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shortscribe",
    about = "Shorts Scribe - Turn a story post and its narration into timed captions",
    version,
    long_about = "Fetches a story post, prepares it as a narration script, corrects the speech recognizer's transcript against that script and groups the timed words into word and sentence captions for a short-video compositor."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./setup.yml or the user config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a story post and store it with its narration script
    Fetch {
        /// Post URL, subreddit (r/name) or local text file (defaults to the configured subreddit)
        #[arg(value_name = "URL_OR_FILE")]
        locator: Option<String>,
    },

    /// Clean up raw post text into a narration script
    Script {
        /// Text file with the raw post
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Correct recognized segments against the script text
    Align {
        /// JSON or YAML file with recognized segments
        #[arg(value_name = "SEGMENTS")]
        segments: PathBuf,

        /// Text file with the script
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Flatten realigned segments into a word transcript
    Words {
        /// JSON or YAML file with realigned segments
        #[arg(value_name = "REALIGNED")]
        realigned: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Group a word transcript into word and sentence captions
    Captions {
        /// JSON or YAML word transcript
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,

        /// Drop words starting at zero or lasting 5 seconds or more (also set by `captions.filter`)
        #[arg(long)]
        filter: bool,

        /// Output file path (defaults to the configured captions file, else the console)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to `captions.format`, else yaml)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Run recognition and alignment on a narration audio file
    Transcribe {
        /// Narration audio file
        #[arg(value_name = "AUDIO")]
        audio: PathBuf,

        /// Text file with the script the narration was generated from
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output file path (defaults to the configured transcript file)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported post sources
    Platforms,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_captions_command() {
        let cli = Cli::try_parse_from([
            "shortscribe",
            "--verbose",
            "captions",
            "transcript.json",
            "--filter",
            "-f",
            "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Captions { transcript, filter, output, format } => {
                assert_eq!(transcript, PathBuf::from("transcript.json"));
                assert!(filter);
                assert!(output.is_none());
                assert_eq!(format, Some(OutputFormat::Json));
            }
            _ => panic!("expected captions command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["shortscribe", "config", "--show", "--config", "my.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.yml")));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["shortscribe", "words", "w.json", "-f", "srt"]).is_err());
    }
}
