use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shorts_scribe::cli::{Cli, Commands, OutputFormat};
use shorts_scribe::config::Config;
use shorts_scribe::transcribe::{self, CommandRecognizer, RealignedSegment, RecognitionOptions, TranscriptionPipeline};
use shorts_scribe::{align, captions, output, script, utils, ScribeError, Segment, SourceRegistry, WordEntry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only commands touching the outside world need a configuration
    let config = match cli.command {
        Commands::Fetch { .. } | Commands::Transcribe { .. } | Commands::Config { .. } => {
            Some(Config::load(cli.config.as_deref())?)
        }
        Commands::Captions { .. } => Config::load_existing(cli.config.as_deref())?,
        _ => None,
    };

    init_tracing(cli.verbose, config.as_ref());

    match cli.command {
        Commands::Fetch { locator } => {
            let config = required(config)?;
            fetch(&config, locator).await?;
        }
        Commands::Script { input, output } => {
            utils::check_file_accessible(&input)?;
            let raw = fs_err::read_to_string(&input)?;
            let prepared = script::prepare_script(&raw);

            match output {
                Some(path) => {
                    fs_err::write(&path, &prepared)?;
                    println!("Script saved to: {}", path.display());
                }
                None => println!("{}", prepared),
            }
        }
        Commands::Align { segments, script, output, format } => {
            let transcript: Vec<Segment> = output::load_from_file(&segments)?;
            let script = fs_err::read_to_string(&script)?;

            let aligned = align::align_transcript(&transcript, &script);
            tracing::info!("Aligned {} segments", aligned.len());

            emit(&aligned, output.as_deref(), format)?;
        }
        Commands::Words { realigned, output, format } => {
            let segments: Vec<RealignedSegment> = output::load_from_file(&realigned)?;
            let words = transcribe::flatten_words(&segments);
            tracing::info!("Flattened {} segments into {} words", segments.len(), words.len());

            emit(&words, output.as_deref(), format)?;
        }
        Commands::Captions { transcript, filter, output, format } => {
            let settings = config.as_ref().map(|c| &c.captions);
            let filter = filter || settings.map_or(false, |s| s.filter);
            let format = format
                .or(settings.map(|s| s.format))
                .unwrap_or(OutputFormat::Yaml);
            let destination = output.or_else(|| config.as_ref().map(Config::captions_path));

            let words: Vec<WordEntry> = output::load_from_file(&transcript)?;
            let captions = captions::build_captions(words, filter);

            if !captions.skipped.is_empty() {
                tracing::warn!("Skipped {} malformed words", captions.skipped.len());
            }
            if let Some(last) = captions.words.last() {
                tracing::info!(
                    "{} word and {} sentence captions spanning {}",
                    captions.words.len(),
                    captions.sentences.len(),
                    utils::format_duration(last.end)
                );
            }

            emit(&captions, destination.as_deref(), format)?;
        }
        Commands::Transcribe { audio, script, output } => {
            let config = required(config)?;
            utils::check_file_accessible(&audio)?;
            let script = fs_err::read_to_string(&script)?;

            let recognizer = CommandRecognizer::new(&config.audio.recognizer_command);
            if !recognizer.check_availability().await {
                return Err(ScribeError::RecognizerUnavailable(config.audio.recognizer_command.clone()).into());
            }

            let pipeline = TranscriptionPipeline::new(recognizer, RecognitionOptions::from(&config.audio))
                .quiet(cli.quiet);
            let words = pipeline.run(&audio, &script).await?;

            let path = match output {
                Some(path) => path,
                None => {
                    config.ensure_cache_dir()?;
                    config.transcript_path()
                }
            };
            output::save_to_file(&words, &path, None)?;
            println!("Transcript saved to: {}", path.display());
        }
        Commands::Config { show } => {
            let config = required(config)?;
            if show {
                config.display();
            } else {
                println!("Configuration loaded. Use --show to print it.");
            }
        }
        Commands::Platforms => {
            let registry = SourceRegistry::new("shorts-scribe")?;
            println!("Supported post sources:");
            for platform in registry.list_platforms() {
                println!("  • {}", platform);
            }
            println!("  • Local text files (title from the file name)");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, config: Option<&Config>) {
    let filter = if verbose {
        EnvFilter::new("shorts_scribe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config.map(|c| c.logging.level.as_str()).unwrap_or("info");
            EnvFilter::new(format!("shorts_scribe={}", level))
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn required(config: Option<Config>) -> Result<Config> {
    config.context("Configuration was not loaded")
}

/// Write to a file when given, otherwise print to stdout
fn emit<T: serde::Serialize + ?Sized>(value: &T, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    match path {
        Some(path) => {
            output::save_to_file(value, path, Some(format))?;
            println!("Saved to: {}", path.display());
            Ok(())
        }
        None => output::print_to_console(value, format),
    }
}

async fn fetch(config: &Config, locator: Option<String>) -> Result<()> {
    let locator = locator.unwrap_or_else(|| format!("r/{}", config.reddit.subreddit));
    let registry = SourceRegistry::new(&config.reddit.user_agent)?;

    let post = registry.fetch_post(&locator).await?;
    let cache_dir = config.ensure_cache_dir()?;

    output::save_to_file(&post, &cache_dir.join(&config.reddit.record_file_json), Some(OutputFormat::Json))?;

    let history: PathBuf = cache_dir
        .join("posts")
        .join(utils::generate_unique_filename(&post.id, "json"));
    output::save_to_file(&post, &history, Some(OutputFormat::Json))?;

    let script_path = cache_dir.join(&config.reddit.record_file_txt);
    fs_err::write(&script_path, script::prepare_script(&post.script_text()))?;

    println!("Fetched '{}' from {}", post.title, post.platform);
    println!("Script saved to: {}", script_path.display());
    Ok(())
}
