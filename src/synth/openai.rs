//! OpenAI-compatible `/v1/audio/speech` provider.

use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use crate::synth::synthesizer::Synthesizer;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Request body for the speech endpoint.
#[derive(Debug, Serialize, PartialEq)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
    pub response_format: &'a str,
}

pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    default_voice: String,
    api_key: String,
}

impl OpenAiSynthesizer {
    pub fn new(
        endpoint: &str,
        model: &str,
        default_voice: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(ReadaloudError::invalid_value(
                "synthesis.openai.api_key_env",
                "API key environment variable is empty or unset",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReadaloudError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            default_voice: default_voice.to_string(),
            api_key,
        })
    }

    /// Serialized request body for `text`.
    pub fn request_body(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice.voice_or(&self.default_voice),
            response_format: "wav",
        };
        serde_json::to_vec(&request)
            .map_err(|e| ReadaloudError::Other(format!("Failed to encode speech request: {e}")))
    }
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    async fn synthesize_one(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        tracing::debug!(
            model = %self.model,
            voice = voice.voice_or(&self.default_voice),
            text_length = text.len(),
            "Calling speech endpoint"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(self.request_body(text, voice)?)
            .send()
            .await
            .map_err(|e| ReadaloudError::Synthesis {
                message: format!("Speech request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ReadaloudError::Synthesis {
                message: format!("Speech endpoint returned status {status}: {}", detail.trim()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReadaloudError::Synthesis {
                message: format!("Failed to read speech response: {e}"),
            })?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> OpenAiSynthesizer {
        OpenAiSynthesizer::new(
            "https://api.example.com/v1/audio/speech",
            "tts-1",
            "alloy",
            "sk-test".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_uses_default_voice() {
        let body = synth()
            .request_body("Hello", &VoiceConfig::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["model"], "tts-1");
        assert_eq!(json["input"], "Hello");
        assert_eq!(json["voice"], "alloy");
        assert_eq!(json["response_format"], "wav");
    }

    #[test]
    fn test_request_body_prefers_configured_voice() {
        let voice = VoiceConfig {
            language: "en".to_string(),
            voice: "nova".to_string(),
        };
        let body = synth().request_body("Hi", &voice).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["voice"], "nova");
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = OpenAiSynthesizer::new(
            "https://api.example.com",
            "tts-1",
            "alloy",
            String::new(),
            Duration::from_secs(5),
        );
        assert!(matches!(
            result,
            Err(ReadaloudError::ConfigInvalidValue { .. })
        ));
    }
}
