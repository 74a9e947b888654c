use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{RealignedSegment, Recognition, RecognitionOptions, Recognizer};
use crate::align::Segment;
use crate::Result;

/// Realigner output as printed by the external recognizer
#[derive(Debug, Deserialize)]
struct RealignResponse {
    segments: Vec<RealignedSegment>,
}

/// Recognizer backed by an external program speaking JSON on stdin/stdout.
///
/// `<program> transcribe --audio <file> ...` prints `{"segments": [...], "language": ".."}`;
/// `<program> realign --audio <file> --language <code>` reads the aligned
/// segments on stdin and prints `{"segments": [{"words": [...]}]}`.
pub struct CommandRecognizer {
    program: String,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if the recognizer program is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn transcribe_args(audio: &Path, options: &RecognitionOptions) -> Vec<String> {
        vec![
            "transcribe".to_string(),
            "--audio".to_string(),
            audio.to_string_lossy().into_owned(),
            "--model".to_string(),
            options.model.clone(),
            "--device".to_string(),
            options.device.clone(),
            "--batch-size".to_string(),
            options.batch_size.to_string(),
            "--compute-type".to_string(),
            options.compute_type.clone(),
            "--language".to_string(),
            options.language.clone(),
        ]
    }

    fn realign_args(audio: &Path, language: &str) -> Vec<String> {
        vec![
            "realign".to_string(),
            "--audio".to_string(),
            audio.to_string_lossy().into_owned(),
            "--language".to_string(),
            language.to_string(),
        ]
    }

    fn check_output(&self, step: &str, output: &Output) -> Result<()> {
        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} {} failed: {}", self.program, step, error.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl Recognizer for CommandRecognizer {
    async fn transcribe(&self, audio: &Path, options: &RecognitionOptions) -> Result<Recognition> {
        tracing::debug!("Running {} transcribe on {}", self.program, audio.display());

        let output = Command::new(&self.program)
            .args(Self::transcribe_args(audio, options))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run recognizer '{}'", self.program))?;

        self.check_output("transcribe", &output)?;

        serde_json::from_slice(&output.stdout).context("Failed to parse recognizer output")
    }

    async fn realign(
        &self,
        segments: &[Segment],
        audio: &Path,
        language: &str,
    ) -> Result<Vec<RealignedSegment>> {
        tracing::debug!("Running {} realign on {} segments", self.program, segments.len());

        let payload = serde_json::to_vec(segments)?;

        let mut child = Command::new(&self.program)
            .args(Self::realign_args(audio, language))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run recognizer '{}'", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Recognizer stdin was not captured")?;

        // Feed stdin while draining stdout so neither pipe can fill up and block
        let write = async move {
            let written = stdin.write_all(&payload).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = output?;
        self.check_output("realign", &output)?;
        written.context("Failed to send segments to recognizer")?;

        let response: RealignResponse =
            serde_json::from_slice(&output.stdout).context("Failed to parse realignment output")?;

        Ok(response.segments)
    }
}
