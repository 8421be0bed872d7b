//! Narration pipeline.
//!
//! Runs the complete text-to-audio flow:
//! normalize → chunk → synthesize → assemble
//!
//! Export is left to the caller, so a failed run never produces an artifact.

use crate::audio::assembler::{Assembly, AudioAssembler, ExcludedSegment};
use crate::config::Config;
use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use crate::synth::orchestrator::{CancelFlag, SkippedUnit, SynthesisOrchestrator};
use crate::synth::progress::ProgressObserver;
use crate::synth::synthesizer::Synthesizer;
use crate::text::chunker::Chunker;
use crate::text::markdown::{IdentityNormalizer, MarkdownNormalizer, Normalizer};
use std::sync::Arc;
use tracing::info;

/// What happened to the units of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// Units produced by the chunker.
    pub units: usize,
    /// Units the provider failed on.
    pub skipped: Vec<SkippedUnit>,
    /// Segments the assembler could not decode.
    pub excluded: Vec<ExcludedSegment>,
}

impl PipelineReport {
    /// Units that made it into the final audio.
    pub fn narrated(&self) -> usize {
        self.units
            .saturating_sub(self.skipped.len() + self.excluded.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub assembly: Assembly,
    pub report: PipelineReport,
}

pub struct Pipeline {
    normalizer: Box<dyn Normalizer>,
    chunker: Chunker,
    orchestrator: SynthesisOrchestrator,
    assembler: AudioAssembler,
    voice: VoiceConfig,
}

impl Pipeline {
    pub fn new(
        normalizer: Box<dyn Normalizer>,
        chunker: Chunker,
        orchestrator: SynthesisOrchestrator,
        assembler: AudioAssembler,
        voice: VoiceConfig,
    ) -> Self {
        Self {
            normalizer,
            chunker,
            orchestrator,
            assembler,
            voice,
        }
    }

    /// Build every stage from a validated configuration.
    pub fn from_config(
        config: &Config,
        synthesizer: Arc<dyn Synthesizer>,
        cancel: CancelFlag,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self> {
        config.validate()?;

        let normalizer: Box<dyn Normalizer> = if config.markdown.enabled {
            Box::new(MarkdownNormalizer::new(config.markdown_options()))
        } else {
            Box::new(IdentityNormalizer)
        };
        let orchestrator = SynthesisOrchestrator::new(synthesizer)
            .with_jobs(config.synthesis.jobs)
            .with_cancel_flag(cancel)
            .with_observer(observer);

        Ok(Self::new(
            normalizer,
            Chunker::new(config.synthesis.max_unit_length)?,
            orchestrator,
            AudioAssembler::new(config.assembly_settings())?,
            config.voice_config(),
        ))
    }

    /// Narrate `text` into one assembled track.
    ///
    /// # Errors
    /// - [`ReadaloudError::EmptyInput`] when nothing is left after normalization
    /// - [`ReadaloudError::EmptyResult`] when every unit failed to synthesize
    /// - [`ReadaloudError::EmptyAssembly`] when no segment could be decoded
    /// - [`ReadaloudError::Cancelled`] when interrupted
    pub async fn run(&self, text: &str) -> Result<PipelineOutput> {
        let normalized = self.normalizer.normalize(text);
        info!(
            normalizer = self.normalizer.name(),
            input_chars = text.chars().count(),
            normalized_chars = normalized.chars().count(),
            "Normalized input"
        );

        let units = self.chunker.chunk(&normalized);
        if units.is_empty() {
            return Err(ReadaloudError::EmptyInput);
        }
        info!(
            units = units.len(),
            max_length = self.chunker.max_length(),
            "Chunked text"
        );

        let synthesis = self.orchestrator.synthesize(&units, &self.voice).await?;
        let assembly = self.assembler.assemble(&synthesis.segments)?;

        let report = PipelineReport {
            units: units.len(),
            skipped: synthesis.skipped,
            excluded: assembly.excluded.clone(),
        };
        Ok(PipelineOutput { assembly, report })
    }
}
