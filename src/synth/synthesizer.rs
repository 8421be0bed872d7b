use crate::audio::codec;
use crate::defaults;
use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for text-to-speech providers.
///
/// This trait allows swapping implementations (HTTP services, local programs,
/// mocks).
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize one unit of text.
    ///
    /// # Returns
    /// Encoded audio bytes in any container the assembler can decode.
    async fn synthesize_one(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Implement Synthesizer for Arc<T> to allow sharing across tasks.
#[async_trait]
impl<T: Synthesizer + ?Sized> Synthesizer for Arc<T> {
    async fn synthesize_one(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>> {
        (**self).synthesize_one(text, voice).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock synthesizer for testing.
///
/// Returns a constant-amplitude WAV tone per call. Failures and delays can be
/// keyed on the unit text, so behaviour does not depend on call order.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    name: String,
    sample_rate: u32,
    duration: Duration,
    amplitude: i16,
    fail_all: bool,
    empty_response: bool,
    failing_texts: Vec<String>,
    delays: Vec<(String, Duration)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    /// Create a mock producing 100 ms tones at the default output rate.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            duration: Duration::from_millis(100),
            amplitude: 8192,
            fail_all: false,
            empty_response: false,
            failing_texts: Vec::new(),
            delays: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Length of every returned tone.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sample rate of the returned WAV data.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Constant sample value of the tone.
    pub fn with_amplitude(mut self, amplitude: i16) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Fail only for units whose text equals `text`.
    pub fn with_failure_on(mut self, text: &str) -> Self {
        self.failing_texts.push(text.to_string());
        self
    }

    /// Succeed with an empty payload.
    pub fn with_empty_response(mut self) -> Self {
        self.empty_response = true;
        self
    }

    /// Sleep for `delay` before answering a unit whose text equals `text`.
    pub fn with_delay_for(mut self, text: &str, delay: Duration) -> Self {
        self.delays.push((text.to_string(), delay));
        self
    }

    /// Texts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn tone(&self) -> Result<Vec<u8>> {
        let len = (self.sample_rate as u128 * self.duration.as_millis() / 1000) as usize;
        let sample = self.amplitude as f32 / i16::MAX as f32;
        codec::encode_wav(&vec![sample; len], self.sample_rate)
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize_one(&self, text: &str, _voice: &VoiceConfig) -> Result<Vec<u8>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }

        if let Some((_, delay)) = self.delays.iter().find(|(t, _)| t == text) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_all || self.failing_texts.iter().any(|t| t == text) {
            return Err(ReadaloudError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }

        if self.empty_response {
            return Ok(Vec::new());
        }

        self.tone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
