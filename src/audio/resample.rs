//! Sample-rate conversion.

/// Simple linear interpolation resampling.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = (source_pos - source_idx as f64) as f32;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}

/// Average interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_identity_same_rate() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(resample(&samples, 24000, 24000), samples);
    }

    #[test]
    fn resample_upsample_interpolates() {
        let samples = vec![0.0, 0.5, 1.0];
        let resampled = resample(&samples, 12000, 24000);

        assert_eq!(resampled.len(), 6);
        assert_eq!(resampled[0], 0.0);
        assert!(resampled[1] > 0.0 && resampled[1] < 0.5);
        assert_eq!(resampled[2], 0.5);
    }

    #[test]
    fn resample_downsample_halves_length() {
        let samples = vec![0.0; 4800];
        assert_eq!(resample(&samples, 48000, 24000).len(), 2400);
    }

    #[test]
    fn resample_handles_edge_cases() {
        assert!(resample(&[], 16000, 24000).is_empty());

        let single = resample(&[0.3], 48000, 24000);
        assert_eq!(single, vec![0.3]);
    }

    #[test]
    fn resample_preserves_constant_signal() {
        let samples = vec![0.25; 100];
        let resampled = resample(&samples, 22050, 24000);
        assert!(resampled.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn downmix_averages_frames() {
        let stereo = vec![-0.5, 0.5, 0.2, 0.4];
        let mono = downmix(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-6);
        assert!((mono[1] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn downmix_mono_is_identity() {
        let mono = vec![0.1, 0.2];
        assert_eq!(downmix(&mono, 1), mono);
    }
}
