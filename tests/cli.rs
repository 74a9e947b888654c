use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn shortscribe() -> Command {
    Command::cargo_bin("shortscribe").unwrap()
}

/// Run from `dir` with no user configuration in reach
fn shortscribe_in(dir: &std::path::Path) -> Command {
    let mut cmd = shortscribe();
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

#[test]
fn captions_command_groups_sentences() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("transcript.json");
    std::fs::write(
        &transcript,
        r#"[
            {"word": "Hello", "start": 0.1, "end": 0.5},
            {"word": "world.", "start": 0.6, "end": 1.0},
            {"word": "Bye!", "start": 1.2, "end": 1.5}
        ]"#,
    )
    .unwrap();

    let output = shortscribe_in(dir.path())
        .args(["captions", transcript.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let captions: Value = serde_json::from_slice(&output.stdout).unwrap();
    let sentences = captions["sentences"].as_array().unwrap();

    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0]["sentence"], "Hello world. ");
    assert_eq!(sentences[0]["start"], 0.0);
    assert_eq!(sentences[0]["end"], 1.2);
    assert_eq!(sentences[1]["sentence"], "Bye! ");
    assert_eq!(captions["words"][1]["word"], "Hello world. ");
}

#[test]
fn captions_command_follows_config_settings() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("transcript.json");
    let config = dir.path().join("setup.yml");
    std::fs::write(
        &transcript,
        r#"[
            {"word": "Zero", "start": 0.0, "end": 0.2},
            {"word": "Hi.", "start": 0.5, "end": 0.9}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        &config,
        format!(
            "cache_dir: {}\ncaptions:\n  filter: true\n  captions_file: captions.json\n  format: json\n",
            dir.path().join("cache").display()
        ),
    )
    .unwrap();

    shortscribe_in(dir.path())
        .args(["captions", transcript.to_str().unwrap(), "--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("captions.json"));

    let written = std::fs::read_to_string(dir.path().join("cache").join("captions.json")).unwrap();
    let captions: Value = serde_json::from_str(&written).unwrap();
    let words = captions["words"].as_array().unwrap();

    assert_eq!(words.len(), 1);
    assert_eq!(words[0]["word"], "Hi. ");
}

#[test]
fn captions_flags_override_config_output() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("transcript.json");
    let config = dir.path().join("setup.yml");
    std::fs::write(&transcript, r#"[{"word": "Zero.", "start": 0.0, "end": 0.2}]"#).unwrap();
    std::fs::write(
        &config,
        format!("cache_dir: {}\ncaptions:\n  format: json\n", dir.path().join("cache").display()),
    )
    .unwrap();

    let output = shortscribe_in(dir.path())
        .args(["captions", transcript.to_str().unwrap(), "--config", config.to_str().unwrap()])
        .args(["-o", dir.path().join("out.yml").to_str().unwrap(), "-f", "yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let written = std::fs::read_to_string(dir.path().join("out.yml")).unwrap();
    assert!(written.contains("sentences:"));
    assert!(written.contains("Zero."));
    assert!(!dir.path().join("cache").join("captions.yml").exists());
}

#[test]
fn align_command_corrects_segments() {
    let dir = tempfile::tempdir().unwrap();
    let segments = dir.path().join("segments.json");
    let script = dir.path().join("script.txt");
    let aligned = dir.path().join("out").join("aligned.json");

    std::fs::write(
        &segments,
        r#"[
            {"text": "helo wrld", "start": 0.0, "end": 1.0},
            {"text": "how r u", "start": 1.0, "end": 2.0}
        ]"#,
    )
    .unwrap();
    std::fs::write(&script, "hello world how are you").unwrap();

    shortscribe()
        .args([
            "align",
            segments.to_str().unwrap(),
            script.to_str().unwrap(),
            "-o",
            aligned.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&aligned).unwrap()).unwrap();
    assert_eq!(value[0]["text"], "hello world");
    assert_eq!(value[1]["text"], "how");
    assert_eq!(value[1]["start"], 1.0);
    assert_eq!(value[1]["end"], 2.0);
}

#[test]
fn words_command_backfills_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let realigned = dir.path().join("realigned.json");
    std::fs::write(
        &realigned,
        r#"[{"words": [{"word": "hi"}, {"word": "there", "start": 0.4, "end": 0.9}]}]"#,
    )
    .unwrap();

    let output = shortscribe()
        .args(["words", realigned.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let words: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(words[0]["start"], 0.0);
    assert_eq!(words[0]["end"], 0.4);
}

#[test]
fn script_command_prints_prepared_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("post.txt");
    std::fs::write(&input, "I sold my 2nd car.").unwrap();

    shortscribe()
        .args(["script", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 nd car."));
}

#[test]
fn missing_transcript_fails() {
    let dir = tempfile::tempdir().unwrap();
    shortscribe_in(dir.path())
        .args(["captions", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}
