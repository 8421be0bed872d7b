//! Speech synthesis: the provider seam, concrete providers and the
//! orchestrator that drives them unit by unit.

pub mod command;
#[cfg(feature = "http")]
pub mod google;
#[cfg(feature = "http")]
pub mod openai;
pub mod orchestrator;
pub mod progress;
pub mod synthesizer;

pub use orchestrator::{CancelFlag, SkippedUnit, SynthesisOrchestrator, SynthesisReport};
pub use progress::{NoProgress, ProgressObserver};
pub use synthesizer::{MockSynthesizer, Synthesizer};

use crate::defaults;

/// Encoded audio returned by the provider for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Index of the unit this audio belongs to.
    pub index: usize,
    /// Raw container bytes (WAV, MP3, ...), decoded later by the assembler.
    pub audio: Vec<u8>,
}

/// Voice parameters fixed for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Language code passed to the provider (e.g. `ja`, `en`).
    pub language: String,
    /// Provider-specific voice name; empty means the provider default.
    pub voice: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            voice: String::new(),
        }
    }
}

impl VoiceConfig {
    /// Voice name, or `fallback` when none is configured.
    pub fn voice_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.voice.is_empty() {
            fallback
        } else {
            &self.voice
        }
    }
}
