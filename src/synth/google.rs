//! Google Translate text-to-speech endpoint.
//!
//! The endpoint rejects long queries, so each unit is split again into
//! pieces of at most [`MAX_QUERY_CHARS`] characters with the regular chunker.
//! The returned MP3 streams are frame-aligned and can be concatenated as-is.

use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use crate::synth::synthesizer::Synthesizer;
use crate::text::chunker::Chunker;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Longest query the endpoint accepts reliably.
pub const MAX_QUERY_CHARS: usize = 100;

const USER_AGENT: &str = concat!("readaloud/", env!("CARGO_PKG_VERSION"));

/// Synthesizer for `translate.google.<tld>/translate_tts`.
pub struct GoogleSynthesizer {
    client: reqwest::Client,
    tld: String,
    slow: bool,
    chunker: Chunker,
}

impl GoogleSynthesizer {
    pub fn new(tld: &str, slow: bool, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReadaloudError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            tld: tld.to_string(),
            slow,
            chunker: Chunker::new(MAX_QUERY_CHARS)?,
        })
    }

    /// Request URL for one piece of text.
    pub fn request_url(&self, text: &str, language: &str) -> Result<Url> {
        let base = format!("https://translate.google.{}/translate_tts", self.tld);
        let speed = if self.slow { "0.24" } else { "1" };
        let textlen = text.chars().count().to_string();
        Url::parse_with_params(
            &base,
            &[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", language),
                ("total", "1"),
                ("idx", "0"),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
            ],
        )
        .map_err(|e| ReadaloudError::Synthesis {
            message: format!("Invalid request URL for tld '{}': {e}", self.tld),
        })
    }

    async fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let url = self.request_url(text, language)?;
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| ReadaloudError::Synthesis {
                    message: format!("Google TTS request failed: {e}"),
                })?;

        if !response.status().is_success() {
            return Err(ReadaloudError::Synthesis {
                message: format!("Google TTS returned status {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReadaloudError::Synthesis {
                message: format!("Failed to read Google TTS response: {e}"),
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Synthesizer for GoogleSynthesizer {
    async fn synthesize_one(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        let pieces = self.chunker.chunk(text);
        let mut audio = Vec::new();

        for piece in &pieces {
            tracing::trace!(
                piece = piece.index,
                pieces = pieces.len(),
                "Requesting Google TTS piece"
            );
            audio.extend(self.fetch(&piece.text, &voice.language).await?);
        }

        Ok(audio)
    }

    fn name(&self) -> &str {
        "google"
    }
}
