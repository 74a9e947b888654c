use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::Result;

impl OutputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yml" | "yaml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Render a value in the requested format
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(content)
}

/// Parse a value, trying the hinted format first
pub fn parse<T: DeserializeOwned>(content: &str, format: Option<OutputFormat>) -> Result<T> {
    match format {
        Some(OutputFormat::Json) => serde_json::from_str(content).context("Failed to parse JSON"),
        // YAML is a superset of JSON, so it covers unknown extensions too
        Some(OutputFormat::Yaml) | None => serde_yaml::from_str(content).context("Failed to parse YAML"),
    }
}

/// Save a value to file, inferring the format from the extension when not given
pub fn save_to_file<T: Serialize + ?Sized>(value: &T, path: &Path, format: Option<OutputFormat>) -> Result<()> {
    let format = format
        .or_else(|| OutputFormat::from_path(path))
        .unwrap_or(OutputFormat::Json);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    fs_err::write(path, render(value, format)?)?;
    tracing::info!("Saved {} to {}", format, path.display());
    Ok(())
}

/// Load a value from a JSON or YAML file
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs_err::read_to_string(path)?;
    parse(&content, OutputFormat::from_path(path))
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Print a value to the console
pub fn print_to_console<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Segment;
    use crate::captions::{build_captions, Captions, WordEntry};

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.json")), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path(Path::new("a.YML")), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_path(Path::new("a.txt")), None);
    }

    #[test]
    fn test_segments_json_shape() {
        let json = render(&vec![Segment::new("hello", 0.0, 1.0)], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["text"], "hello");
        assert_eq!(value[0]["start"], 0.0);
        assert_eq!(value[0]["end"], 1.0);
    }

    #[test]
    fn test_captions_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("captions.yml");
        let captions = build_captions(
            vec![WordEntry::new("Hi.", 0.2, 0.5), WordEntry::new("", 0.5, 0.6)],
            false,
        );

        save_to_file(&captions, &path, None).unwrap();
        let content = fs_err::read_to_string(&path).unwrap();
        assert!(content.contains("sentences:"));
        assert!(!content.contains("skipped"));

        let loaded: Captions = load_from_file(&path).unwrap();
        assert_eq!(loaded.words, captions.words);
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_load_json_word_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        fs_err::write(&path, r#"[{"word": "hello", "start": 0.1, "end": 0.4}]"#).unwrap();

        let words: Vec<WordEntry> = load_from_file(&path).unwrap();
        assert_eq!(words, vec![WordEntry::new("hello", 0.1, 0.4)]);
    }
}
