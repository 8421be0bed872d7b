//! Default configuration constants for readaloud.
//!
//! Shared by the config layer, the CLI and the pipeline so every entry point
//! agrees on the same values.

/// Default maximum unit length in characters.
///
/// Comfortably below the request limits of the supported providers while
/// keeping the number of round-trips low for book-length input.
pub const MAX_UNIT_LENGTH: usize = 1800;

/// Minimum position of a natural boundary, as a fraction of the unit length.
///
/// A boundary found earlier than this is ignored in favour of a hard cut, so
/// units never become much smaller than the configured length.
pub const MIN_BOUNDARY_RATIO: f64 = 0.3;

/// Default playback tempo (1.0 = unchanged).
pub const TEMPO: f32 = 1.2;

/// Tempo values closer than this to 1.0 leave the signal untouched.
pub const TEMPO_EPSILON: f32 = 1e-3;

/// Accepted tempo range, inclusive.
pub const MIN_TEMPO: f32 = 0.1;
pub const MAX_TEMPO: f32 = 10.0;

/// Default loudness offset in decibels.
pub const GAIN_DB: f32 = 3.0;

/// Largest accepted loudness offset in either direction, in decibels.
pub const MAX_GAIN_DB: f32 = 96.0;

/// Default silence inserted between consecutive segments, in milliseconds.
pub const SILENCE_MS: u64 = 250;

/// Default language code passed to the provider.
pub const DEFAULT_LANGUAGE: &str = "ja";

/// Default output path.
pub const DEFAULT_OUTPUT: &str = "output.mp3";

/// Path value meaning stdin (input) or stdout (output).
pub const STDIO_PATH: &str = "-";

/// Output sample rate in Hz.
///
/// WAV exports are 16-bit mono PCM, so their bitrate is
/// `SAMPLE_RATE * 16` bit/s (384 kbit/s at 24 kHz).
pub const SAMPLE_RATE: u32 = 24000;

/// Constant bitrate of MP3 exports, in kbit/s.
pub const MP3_BITRATE_KBPS: u32 = 192;

/// Chunk length used by the tempo stretcher, in milliseconds.
pub const TEMPO_CHUNK_MS: u32 = 150;

/// Crossfade between stretched chunks, in milliseconds.
pub const TEMPO_CROSSFADE_MS: u32 = 25;

/// Default number of concurrent provider calls.
pub const JOBS: usize = 1;

/// Languages listed by `readaloud languages`.
///
/// Providers accept any ISO 639-1 code; these are the ones known to work with
/// every bundled provider.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ja", "日本語"),
    ("en", "English"),
    ("zh", "中文"),
    ("ko", "한국어"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("it", "Italiano"),
    ("pt", "Português"),
    ("ru", "Русский"),
    ("ar", "العربية"),
    ("hi", "हिन्दी"),
];

/// Look up the display name of a language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
