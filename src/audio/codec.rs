//! Decoding provider audio and encoding the exported artifact.
//!
//! Everything is decoded to mono `f32` in `[-1.0, 1.0]` at the caller's
//! output rate. RIFF data goes through `hound`; anything else (MP3 from the
//! HTTP providers) is probed by `symphonia`. Exports are 16-bit PCM WAV or
//! constant-bitrate MP3 through LAME.

use crate::audio::export::OutputFormat;
use crate::audio::resample::{downmix, resample};
use crate::error::{ReadaloudError, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode encoded audio to mono samples at `target_rate`.
pub fn decode(bytes: &[u8], target_rate: u32) -> Result<Vec<f32>> {
    if bytes.is_empty() {
        return Err(decode_error("empty audio payload"));
    }

    let (interleaved, channels, rate) = if bytes.starts_with(b"RIFF") {
        decode_wav(bytes)?
    } else {
        decode_compressed(bytes)?
    };

    if rate == 0 || channels == 0 {
        return Err(decode_error("audio stream declares no channels or sample rate"));
    }

    let mono = downmix(&interleaved, channels);
    Ok(resample(&mono, rate, target_rate))
}

/// Encode mono samples in the requested container.
pub fn encode(samples: &[f32], sample_rate: u32, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Wav => encode_wav(samples, sample_rate),
        OutputFormat::Mp3 => encode_mp3(samples, sample_rate),
    }
}

/// Encode mono samples as 16-bit PCM WAV.
///
/// Samples outside `[-1.0, 1.0]` are clipped.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(export_error)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample)).map_err(export_error)?;
    }
    writer.finalize().map_err(export_error)?;

    Ok(cursor.into_inner())
}

/// Encode mono samples as constant-bitrate MP3 at
/// [`MP3_BITRATE_KBPS`](crate::defaults::MP3_BITRATE_KBPS).
#[cfg(feature = "mp3")]
pub fn encode_mp3(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

    let mut builder =
        Builder::new().ok_or_else(|| mp3_error("failed to allocate LAME encoder"))?;
    builder
        .set_num_channels(1)
        .map_err(|e| mp3_error(format!("channels: {e:?}")))?;
    builder
        .set_sample_rate(sample_rate)
        .map_err(|e| mp3_error(format!("sample rate {sample_rate} Hz: {e:?}")))?;
    builder
        .set_brate(Bitrate::Kbps192)
        .map_err(|e| mp3_error(format!("bitrate: {e:?}")))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| mp3_error(format!("quality: {e:?}")))?;
    let mut encoder = builder
        .build()
        .map_err(|e| mp3_error(format!("encoder setup: {e:?}")))?;

    let pcm: Vec<i16> = samples.iter().map(|&s| to_pcm16(s)).collect();
    // Worst-case frame data plus room for the final flush
    let capacity = mp3lame_encoder::max_required_buffer_size(pcm.len()) + 7200;
    let mut mp3 = Vec::with_capacity(capacity);
    encoder
        .encode_to_vec(MonoPcm(&pcm), &mut mp3)
        .map_err(|e| mp3_error(format!("encode: {e:?}")))?;
    encoder
        .flush_to_vec::<FlushNoGap>(&mut mp3)
        .map_err(|e| mp3_error(format!("flush: {e:?}")))?;

    Ok(mp3)
}

#[cfg(not(feature = "mp3"))]
pub fn encode_mp3(_samples: &[f32], _sample_rate: u32) -> Result<Vec<u8>> {
    Err(mp3_error("readaloud was built without the 'mp3' feature"))
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, usize, u32)> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| decode_error(format!("Failed to parse WAV data: {}", e)))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| decode_error(format!("Failed to read WAV samples: {}", e)))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| decode_error(format!("Failed to read WAV samples: {}", e)))?
        }
    };

    Ok((samples, spec.channels as usize, spec.sample_rate))
}

fn decode_compressed(bytes: &[u8]) -> Result<(Vec<f32>, usize, u32)> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(format!("Unrecognized audio container: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error("no decodable audio track"))?;
    let track_id = track.id;
    let mut rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(format!("Unsupported codec: {}", e)))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error(format!("Failed to read packet: {}", e))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                rate = spec.rate;
                channels = spec.channels.count();
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // A corrupt frame is skipped, not fatal.
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(error = e, "Skipping undecodable frame");
            }
            Err(e) => return Err(decode_error(format!("Decoder failure: {}", e))),
        }
    }

    if samples.is_empty() || rate == 0 || channels == 0 {
        return Err(decode_error("audio stream contains no samples"));
    }
    Ok((samples, channels, rate))
}

fn decode_error(message: impl Into<String>) -> ReadaloudError {
    ReadaloudError::AudioDecode {
        message: message.into(),
    }
}

fn mp3_error(message: impl Into<String>) -> ReadaloudError {
    ReadaloudError::Export {
        message: format!("Failed to encode MP3: {}", message.into()),
    }
}

fn export_error(e: hound::Error) -> ReadaloudError {
    ReadaloudError::Export {
        message: format!("Failed to encode WAV: {}", e),
    }
}
