//! readaloud - Narrate long text and Markdown into a single audio file
//!
//! Text is cleaned of markup, split into bounded units, synthesized unit by
//! unit through a pluggable provider and stitched back into one WAV track.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod synth;
pub mod text;

// Composition root - needs the CLI stack
#[cfg(feature = "cli")]
pub mod app;

// Core traits (text → synthesize → assemble)
pub use synth::progress::ProgressObserver;
pub use synth::synthesizer::Synthesizer;
pub use text::markdown::Normalizer;

// Pipeline
pub use pipeline::{Pipeline, PipelineOutput, PipelineReport};

// Stages
pub use audio::assembler::{Assembly, AssemblySettings, AudioAssembler};
pub use synth::orchestrator::{CancelFlag, SynthesisOrchestrator, SynthesisReport};
pub use text::chunker::{Chunker, Unit};

// Error handling
pub use error::{ReadaloudError, Result};

// Config
pub use config::{Config, ProviderKind};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
