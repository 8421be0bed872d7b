//! Drives the synthesizer over the unit sequence.
//!
//! Units are submitted in order, at most `jobs` at a time. Results come back
//! in submission order whatever the completion order, so the segment sequence
//! always matches the unit sequence with failed units left out.

use crate::error::{ReadaloudError, Result};
use crate::synth::progress::{NoProgress, ProgressObserver};
use crate::synth::synthesizer::Synthesizer;
use crate::synth::{Segment, VoiceConfig};
use crate::text::chunker::Unit;
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Shared interruption flag, set from a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A unit that produced no audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub index: usize,
    pub reason: String,
}

/// Outcome of the synthesis stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisReport {
    /// Successful segments, in unit order.
    pub segments: Vec<Segment>,
    /// Failed units, in unit order.
    pub skipped: Vec<SkippedUnit>,
    /// Number of units submitted.
    pub attempted: usize,
}

pub struct SynthesisOrchestrator {
    synthesizer: Arc<dyn Synthesizer>,
    jobs: usize,
    cancel: CancelFlag,
    observer: Arc<dyn ProgressObserver>,
}

impl SynthesisOrchestrator {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self {
            synthesizer,
            jobs: crate::defaults::JOBS,
            cancel: CancelFlag::new(),
            observer: Arc::new(NoProgress),
        }
    }

    /// Maximum number of provider calls in flight (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Synthesize every unit, skipping the ones that fail.
    ///
    /// An empty unit list yields an empty report. A non-empty list where
    /// every unit failed is [`ReadaloudError::EmptyResult`].
    pub async fn synthesize(&self, units: &[Unit], voice: &VoiceConfig) -> Result<SynthesisReport> {
        let total = units.len();
        let mut report = SynthesisReport::default();
        if total == 0 {
            return Ok(report);
        }

        info!(
            provider = self.synthesizer.name(),
            total,
            jobs = self.jobs,
            "Synthesizing units"
        );
        self.observer.on_start(total);

        let mut results = std::pin::pin!(stream::iter(units)
            .map(|unit| async move {
                // Checked when the unit is submitted, not when it completes.
                if self.cancel.is_cancelled() {
                    return (unit.index, Err(ReadaloudError::Cancelled));
                }
                (unit.index, self.synthesize_unit(unit, voice).await)
            })
            .buffered(self.jobs));

        while let Some((index, result)) = results.next().await {
            let succeeded = match result {
                Ok(audio) => {
                    report.segments.push(Segment { index, audio });
                    true
                }
                Err(ReadaloudError::Cancelled) => {
                    self.observer.on_finish();
                    info!(index, "Synthesis cancelled");
                    return Err(ReadaloudError::Cancelled);
                }
                Err(e) => {
                    warn!(index, error = %e, "Unit failed to synthesize, skipping");
                    report.skipped.push(SkippedUnit {
                        index,
                        reason: e.to_string(),
                    });
                    false
                }
            };
            report.attempted += 1;
            self.observer
                .on_unit(report.attempted, total, index, succeeded);
        }

        self.observer.on_finish();

        if report.segments.is_empty() {
            return Err(ReadaloudError::EmptyResult { attempted: total });
        }

        info!(
            succeeded = report.segments.len(),
            skipped = report.skipped.len(),
            "Synthesis finished"
        );
        Ok(report)
    }

    async fn synthesize_unit(&self, unit: &Unit, voice: &VoiceConfig) -> Result<Vec<u8>> {
        debug!(
            index = unit.index,
            chars = unit.text.chars().count(),
            "Submitting unit"
        );
        let audio = self.synthesizer.synthesize_one(&unit.text, voice).await?;
        if audio.is_empty() {
            return Err(ReadaloudError::Synthesis {
                message: "provider returned no audio".to_string(),
            });
        }
        debug!(index = unit.index, bytes = audio.len(), "Unit synthesized");
        Ok(audio)
    }
}
