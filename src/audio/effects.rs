//! Global gain and tempo adjustments on mono sample buffers.

use std::f32::consts::PI;

/// Linear amplitude factor for a decibel offset.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Scale every sample by `gain_db` decibels.
///
/// A zero offset leaves the buffer untouched, and silent samples stay
/// silent whatever the offset.
pub fn apply_gain(samples: &mut [f32], gain_db: f32) {
    if gain_db == 0.0 {
        return;
    }
    let factor = db_to_gain(gain_db);
    for sample in samples.iter_mut().filter(|s| **s != 0.0) {
        *sample *= factor;
    }
}

/// Pitch-preserving time stretch by overlap-add of fixed-size pieces.
///
/// Output is built from pieces of `chunk + crossfade` samples. Consecutive
/// pieces are placed `chunk` samples apart in the output but taken
/// `chunk * tempo` samples apart in the input, and overlapping edges are
/// blended with a Hann crossfade. Tempo above 1.0 shortens the signal, below
/// 1.0 lengthens it.
#[derive(Debug, Clone)]
pub struct TempoStretcher {
    chunk: usize,
    fade_in: Vec<f32>,
    fade_out: Vec<f32>,
}

impl TempoStretcher {
    pub fn new(chunk_ms: u32, crossfade_ms: u32, sample_rate: u32) -> Self {
        let chunk = ((chunk_ms as u64 * sample_rate as u64) / 1000).max(1) as usize;
        let fade = ((crossfade_ms as u64 * sample_rate as u64) / 1000).max(1) as usize;

        let fade_in: Vec<f32> = (0..fade)
            .map(|i| {
                let t = i as f32 / (fade - 1).max(1) as f32;
                0.5 * (1.0 - (PI * t).cos())
            })
            .collect();
        let fade_out = fade_in.iter().rev().copied().collect();

        Self {
            chunk,
            fade_in,
            fade_out,
        }
    }

    /// Output hop in samples.
    pub fn chunk_samples(&self) -> usize {
        self.chunk
    }

    /// Crossfade length in samples.
    pub fn crossfade_samples(&self) -> usize {
        self.fade_in.len()
    }

    /// Stretch `samples` by `tempo`.
    ///
    /// Signals shorter than one piece are returned unchanged.
    pub fn apply(&self, samples: &[f32], tempo: f32) -> Vec<f32> {
        let fade = self.fade_in.len();
        let piece_len = self.chunk + fade;
        if samples.len() < piece_len || !tempo.is_finite() || tempo <= 0.0 {
            return samples.to_vec();
        }

        let input_hop = ((self.chunk as f64 * tempo as f64).round() as usize).max(1);
        let expected = (samples.len() as f64 / tempo as f64) as usize + piece_len;
        let mut output: Vec<f32> = Vec::with_capacity(expected);

        let mut position = 0;
        while position < samples.len() {
            let end = (position + piece_len).min(samples.len());
            let piece = &samples[position..end];

            let overlap = fade.min(piece.len()).min(output.len());
            let base = output.len() - overlap;
            for i in 0..overlap {
                output[base + i] =
                    output[base + i] * self.fade_out[i] + piece[i] * self.fade_in[i];
            }
            output.extend_from_slice(&piece[overlap..]);

            if end == samples.len() {
                break;
            }
            position += input_hop;
        }

        output
    }
}
