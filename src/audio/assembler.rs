//! Stitches synthesized segments into one track.
//!
//! Segments are decoded and concatenated in the order given with a fixed
//! silence between neighbours. Gain is applied once to the whole track, then
//! tempo, so both act globally rather than per segment.

use crate::audio::codec;
use crate::audio::effects::{TempoStretcher, apply_gain};
use crate::audio::export::OutputFormat;
use crate::defaults;
use crate::error::{ReadaloudError, Result};
use crate::synth::Segment;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters of one assembly, fixed for the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblySettings {
    /// Silence inserted between consecutive segments.
    pub silence: Duration,
    /// Loudness offset in decibels (0 = unchanged).
    pub gain_db: f32,
    /// Playback speed factor (1.0 = unchanged, >1 faster).
    pub tempo: f32,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            silence: Duration::from_millis(defaults::SILENCE_MS),
            gain_db: defaults::GAIN_DB,
            tempo: defaults::TEMPO,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl AssemblySettings {
    /// Reject settings the assembler cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(-defaults::MAX_GAIN_DB..=defaults::MAX_GAIN_DB).contains(&self.gain_db) {
            return Err(ReadaloudError::invalid_value(
                "audio.gain_db",
                format!(
                    "must be between -{0} and {0} dB",
                    defaults::MAX_GAIN_DB
                ),
            ));
        }
        if !(defaults::MIN_TEMPO..=defaults::MAX_TEMPO).contains(&self.tempo) {
            return Err(ReadaloudError::invalid_value(
                "audio.tempo",
                format!(
                    "must be between {} and {}",
                    defaults::MIN_TEMPO,
                    defaults::MAX_TEMPO
                ),
            ));
        }
        if self.sample_rate == 0 {
            return Err(ReadaloudError::invalid_value(
                "audio.sample_rate",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    fn silence_samples(&self) -> usize {
        (self.silence.as_millis() * self.sample_rate as u128 / 1000) as usize
    }

    fn changes_tempo(&self) -> bool {
        (self.tempo - 1.0).abs() > defaults::TEMPO_EPSILON
    }
}

/// A segment left out of the assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedSegment {
    pub index: usize,
    pub reason: String,
}

/// The assembled track.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Mono samples at `settings.sample_rate`.
    pub samples: Vec<f32>,
    /// Settings the track was produced with.
    pub settings: AssemblySettings,
    /// Indices of the segments that made it in, in order.
    pub included: Vec<usize>,
    pub excluded: Vec<ExcludedSegment>,
    /// Number of silence gaps inserted.
    pub gaps: usize,
}

impl Assembly {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.settings.sample_rate as f64)
    }

    /// Encoded bytes of the whole track in `format`.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        codec::encode(&self.samples, self.settings.sample_rate, format)
    }
}

pub struct AudioAssembler {
    settings: AssemblySettings,
    stretcher: TempoStretcher,
}

impl AudioAssembler {
    pub fn new(settings: AssemblySettings) -> Result<Self> {
        settings.validate()?;
        let stretcher = TempoStretcher::new(
            defaults::TEMPO_CHUNK_MS,
            defaults::TEMPO_CROSSFADE_MS,
            settings.sample_rate,
        );
        Ok(Self {
            settings,
            stretcher,
        })
    }

    pub fn settings(&self) -> &AssemblySettings {
        &self.settings
    }

    /// Decode and join `segments` into one track.
    ///
    /// Undecodable segments are logged and excluded. Fails with
    /// [`ReadaloudError::EmptyAssembly`] when nothing is left to join.
    pub fn assemble(&self, segments: &[Segment]) -> Result<Assembly> {
        if segments.is_empty() {
            return Err(ReadaloudError::EmptyAssembly);
        }

        let silence = self.settings.silence_samples();
        let mut samples = Vec::new();
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut gaps = 0;

        for segment in segments {
            let decoded = match codec::decode(&segment.audio, self.settings.sample_rate) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(
                        index = segment.index,
                        error = %e,
                        "Segment could not be decoded, skipping"
                    );
                    excluded.push(ExcludedSegment {
                        index: segment.index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !included.is_empty() {
                samples.resize(samples.len() + silence, 0.0);
                gaps += 1;
            }
            debug!(index = segment.index, samples = decoded.len(), "Appending segment");
            samples.extend_from_slice(&decoded);
            included.push(segment.index);
        }

        if included.is_empty() {
            return Err(ReadaloudError::EmptyAssembly);
        }

        apply_gain(&mut samples, self.settings.gain_db);

        if self.settings.changes_tempo() {
            samples = self.stretcher.apply(&samples, self.settings.tempo);
        }

        let assembly = Assembly {
            samples,
            settings: self.settings,
            included,
            excluded,
            gaps,
        };
        info!(
            segments = assembly.included.len(),
            excluded = assembly.excluded.len(),
            duration_secs = assembly.duration().as_secs_f64(),
            "Assembled audio"
        );
        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 24000;

    fn tone(index: usize, value: f32, len: usize) -> Segment {
        Segment {
            index,
            audio: codec::encode_wav(&vec![value; len], RATE).unwrap(),
        }
    }

    fn plain(silence_ms: u64) -> AudioAssembler {
        AudioAssembler::new(AssemblySettings {
            silence: Duration::from_millis(silence_ms),
            gain_db: 0.0,
            tempo: 1.0,
            sample_rate: RATE,
        })
        .unwrap()
    }

    #[test]
    fn no_segments_is_empty_assembly() {
        assert!(matches!(
            plain(250).assemble(&[]),
            Err(ReadaloudError::EmptyAssembly)
        ));
    }

    #[test]
    fn single_segment_has_no_gaps() {
        let assembly = plain(250).assemble(&[tone(1, 0.5, 480)]).unwrap();
        assert_eq!(assembly.samples.len(), 480);
        assert_eq!(assembly.gaps, 0);
        assert_eq!(assembly.included, vec![1]);
        assert_eq!(assembly.settings, *plain(250).settings());
    }

    #[test]
    fn gaps_sit_only_between_segments() {
        let segments = [tone(1, 0.5, 100), tone(2, 0.5, 100), tone(3, 0.5, 100)];
        let assembly = plain(10).assemble(&segments).unwrap();

        // 10 ms at 24 kHz
        let silence = 240;
        assert_eq!(assembly.samples.len(), 300 + 2 * silence);
        assert_eq!(assembly.gaps, 2);
        assert!(assembly.samples[..100].iter().all(|&s| s != 0.0));
        assert!(assembly.samples[100..100 + silence].iter().all(|&s| s == 0.0));
        assert!(assembly.samples[assembly.samples.len() - 100..].iter().all(|&s| s != 0.0));
    }

    #[test]
    fn zero_silence_is_plain_concatenation() {
        let segments = [tone(1, 0.25, 50), tone(2, -0.25, 50)];
        let assembly = plain(0).assemble(&segments).unwrap();
        assert_eq!(assembly.samples.len(), 100);
        assert_eq!(assembly.gaps, 1);
    }

    #[test]
    fn segment_order_is_kept() {
        let segments = [tone(2, 0.5, 10), tone(1, -0.5, 10)];
        let assembly = plain(0).assemble(&segments).unwrap();
        assert_eq!(assembly.included, vec![2, 1]);
        assert!(assembly.samples[0] > 0.0);
        assert!(assembly.samples[10] < 0.0);
    }

    #[test]
    fn undecodable_segment_is_excluded() {
        let broken = Segment {
            index: 2,
            audio: b"not audio".to_vec(),
        };
        let segments = [tone(1, 0.5, 100), broken, tone(3, 0.5, 100)];
        let assembly = plain(10).assemble(&segments).unwrap();

        assert_eq!(assembly.included, vec![1, 3]);
        assert_eq!(assembly.excluded.len(), 1);
        assert_eq!(assembly.excluded[0].index, 2);
        assert_eq!(assembly.gaps, 1);
        assert_eq!(assembly.samples.len(), 200 + 240);
    }

    #[test]
    fn all_segments_undecodable_is_empty_assembly() {
        let segments = [Segment {
            index: 1,
            audio: b"junk".to_vec(),
        }];
        assert!(matches!(
            plain(0).assemble(&segments),
            Err(ReadaloudError::EmptyAssembly)
        ));
    }

    #[test]
    fn gain_is_applied_globally() {
        let assembler = AudioAssembler::new(AssemblySettings {
            silence: Duration::from_millis(1),
            gain_db: 6.0,
            tempo: 1.0,
            sample_rate: RATE,
        })
        .unwrap();
        let assembly = assembler
            .assemble(&[tone(1, 0.25, 10), tone(2, 0.25, 10)])
            .unwrap();

        let boosted = 0.25 * db_gain(6.0);
        assert!((assembly.samples[0] - boosted).abs() < 1e-3);
        assert_eq!(assembly.samples[10], 0.0);
        assert!((assembly.samples[assembly.samples.len() - 1] - boosted).abs() < 1e-3);
    }

    fn db_gain(db: f32) -> f32 {
        crate::audio::effects::db_to_gain(db)
    }

    #[test]
    fn tempo_shortens_the_track() {
        let assembler = AudioAssembler::new(AssemblySettings {
            silence: Duration::ZERO,
            gain_db: 0.0,
            tempo: 2.0,
            sample_rate: RATE,
        })
        .unwrap();
        let assembly = assembler.assemble(&[tone(1, 0.3, RATE as usize * 2)]).unwrap();
        assert!(assembly.samples.len() < RATE as usize + 5000);
        assert!(assembly.samples.len() > RATE as usize - 5000);
    }

    #[test]
    fn tempo_within_epsilon_is_ignored() {
        let assembler = AudioAssembler::new(AssemblySettings {
            silence: Duration::ZERO,
            gain_db: 0.0,
            tempo: 1.0005,
            sample_rate: RATE,
        })
        .unwrap();
        let assembly = assembler.assemble(&[tone(1, 0.3, 10_000)]).unwrap();
        assert_eq!(assembly.samples.len(), 10_000);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_tempo = AssemblySettings {
            tempo: 0.0,
            ..Default::default()
        };
        assert!(AudioAssembler::new(bad_tempo).is_err());

        let bad_gain = AssemblySettings {
            gain_db: f32::NAN,
            ..Default::default()
        };
        assert!(AudioAssembler::new(bad_gain).is_err());

        let bad_rate = AssemblySettings {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(AudioAssembler::new(bad_rate).is_err());
    }

    #[test]
    fn tiny_tempo_is_rejected() {
        for tempo in [0.0001, 0.09, 10.5, f32::INFINITY] {
            let settings = AssemblySettings {
                tempo,
                ..Default::default()
            };
            assert!(
                matches!(
                    settings.validate(),
                    Err(ReadaloudError::ConfigInvalidValue { .. })
                ),
                "tempo {tempo}"
            );
        }
        for tempo in [0.1, 10.0] {
            let settings = AssemblySettings {
                tempo,
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "tempo {tempo}");
        }
    }

    #[test]
    fn huge_gain_is_rejected() {
        for gain_db in [800.0, -800.0, 96.5] {
            let settings = AssemblySettings {
                gain_db,
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "gain {gain_db}");
        }
        let loud = AssemblySettings {
            gain_db: 96.0,
            ..Default::default()
        };
        assert!(loud.validate().is_ok());
    }

    #[test]
    fn encode_wav_round_trips_duration() {
        let assembly = plain(0).assemble(&[tone(1, 0.1, 2400)]).unwrap();
        assert_eq!(assembly.duration(), Duration::from_millis(100));
        let wav = assembly.encode(OutputFormat::Wav).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.duration(), 2400);
    }
}
