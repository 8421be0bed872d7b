//! Local program provider.
//!
//! Runs a speech program once per unit and takes its stdout as the audio
//! payload. The default invocation is `espeak-ng --stdout -v {voice} {text}`,
//! which writes a WAV stream.

use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use crate::synth::synthesizer::Synthesizer;
use async_trait::async_trait;
use tokio::process::Command;

/// Synthesizer backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// `args` may contain `{text}`, `{lang}` and `{voice}` placeholders.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Substitute placeholders in every argument.
    ///
    /// `{voice}` falls back to the language code when no voice is configured.
    pub fn expand_args(&self, text: &str, voice: &VoiceConfig) -> Vec<String> {
        let voice_name = voice.voice_or(&voice.language);
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{lang}", &voice.language)
                    .replace("{voice}", voice_name)
                    .replace("{text}", text)
            })
            .collect()
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    async fn synthesize_one(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let args = self.expand_args(text, voice);
        tracing::debug!(program = %self.program, args = args.len(), "Running synthesis command");

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ReadaloudError::Synthesis {
                        message: format!(
                            "{} not found. Is it installed and on PATH?",
                            self.program
                        ),
                    }
                } else {
                    ReadaloudError::Synthesis {
                        message: format!("Failed to execute {}: {}", self.program, e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReadaloudError::Synthesis {
                message: format!(
                    "{} failed with status {:?}: {}",
                    self.program,
                    output.status.code(),
                    stderr.trim()
                ),
            });
        }

        Ok(output.stdout)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(language: &str, name: &str) -> VoiceConfig {
        VoiceConfig {
            language: language.to_string(),
            voice: name.to_string(),
        }
    }

    #[test]
    fn test_expand_args_substitutes_placeholders() {
        let synth = CommandSynthesizer::new(
            "espeak-ng",
            vec![
                "--stdout".to_string(),
                "-v".to_string(),
                "{voice}".to_string(),
                "--lang={lang}".to_string(),
                "{text}".to_string(),
            ],
        );

        let args = synth.expand_args("hello there", &voice("en", "en-us"));
        assert_eq!(
            args,
            vec!["--stdout", "-v", "en-us", "--lang=en", "hello there"]
        );
    }

    #[test]
    fn test_expand_args_voice_falls_back_to_language() {
        let synth = CommandSynthesizer::new("espeak-ng", vec!["{voice}".to_string()]);
        assert_eq!(synth.expand_args("x", &voice("ja", "")), vec!["ja"]);
    }

    #[test]
    fn test_text_with_braces_is_not_expanded_twice() {
        let synth = CommandSynthesizer::new("echo", vec!["{text}".to_string()]);
        assert_eq!(
            synth.expand_args("literal {lang}", &voice("en", "")),
            vec!["literal {lang}"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_audio_payload() {
        let synth =
            CommandSynthesizer::new("printf", vec!["%s".to_string(), "{text}".to_string()]);
        let bytes = synth
            .synthesize_one("payload", &voice("en", ""))
            .await
            .unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_synthesis_error() {
        let synth = CommandSynthesizer::new("false", Vec::new());
        let result = synth.synthesize_one("x", &voice("en", "")).await;
        assert!(matches!(result, Err(ReadaloudError::Synthesis { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_synthesis_error() {
        let synth = CommandSynthesizer::new("readaloud-no-such-program-4821", Vec::new());
        match synth.synthesize_one("x", &voice("en", "")).await {
            Err(ReadaloudError::Synthesis { message }) => {
                assert!(message.contains("not found"), "got: {}", message);
            }
            other => panic!("Expected Synthesis error, got {:?}", other),
        }
    }
}
