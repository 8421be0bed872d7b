use crate::audio::assembler::AssemblySettings;
use crate::audio::export::OutputFormat;
use crate::defaults;
use crate::error::{ReadaloudError, Result};
use crate::synth::VoiceConfig;
use crate::text::markdown::MarkdownOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub synthesis: SynthesisConfig,
    pub audio: AudioConfig,
    pub markdown: MarkdownConfig,
}

/// Synthesis provider selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Google,
    Command,
    Openai,
}

impl std::str::FromStr for ProviderKind {
    type Err = ReadaloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "command" => Ok(Self::Command),
            "openai" => Ok(Self::Openai),
            other => Err(ReadaloudError::invalid_value(
                "synthesis.provider",
                format!("unknown provider '{}' (expected google, command or openai)", other),
            )),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Command => "command",
            Self::Openai => "openai",
        };
        f.write_str(name)
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub provider: ProviderKind,
    pub language: String,
    pub voice: String,
    pub max_unit_length: usize,
    pub jobs: usize,
    pub google: GoogleConfig,
    pub command: CommandConfig,
    pub openai: OpenAiConfig,
}

/// Google Translate TTS endpoint options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoogleConfig {
    pub tld: String,
    pub slow: bool,
    pub timeout_secs: u64,
}

/// Local command provider options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommandConfig {
    pub program: String,
    pub args: Vec<String>,
}

/// OpenAI-compatible speech endpoint options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub model: String,
    pub voice: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

/// Assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub silence_ms: u64,
    pub gain_db: f32,
    pub tempo: f32,
    pub sample_rate: u32,
    /// Export container; unset means "follow the output extension".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

/// Markdown normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkdownConfig {
    pub enabled: bool,
    pub preserve_links: bool,
    pub preserve_emphasis: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            voice: String::new(),
            max_unit_length: defaults::MAX_UNIT_LENGTH,
            jobs: defaults::JOBS,
            google: GoogleConfig::default(),
            command: CommandConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            slow: false,
            timeout_secs: 30,
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            args: ["--stdout", "-v", "{voice}", "{text}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/speech".to_string(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            silence_ms: defaults::SILENCE_MS,
            gain_db: defaults::GAIN_DB,
            tempo: defaults::TEMPO,
            sample_rate: defaults::SAMPLE_RATE,
            format: None,
        }
    }
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preserve_links: false,
            preserve_emphasis: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReadaloudError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ReadaloudError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ReadaloudError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - READALOUD_LANGUAGE → synthesis.language
    /// - READALOUD_PROVIDER → synthesis.provider
    /// - READALOUD_VOICE → synthesis.voice
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("READALOUD_LANGUAGE")
            && !language.is_empty()
        {
            self.synthesis.language = language;
        }

        if let Ok(provider) = std::env::var("READALOUD_PROVIDER")
            && !provider.is_empty()
        {
            match provider.parse() {
                Ok(kind) => self.synthesis.provider = kind,
                Err(e) => tracing::warn!(error = %e, "Ignoring READALOUD_PROVIDER"),
            }
        }

        if let Ok(voice) = std::env::var("READALOUD_VOICE")
            && !voice.is_empty()
        {
            self.synthesis.voice = voice;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/readaloud/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("readaloud")
            .join("config.toml")
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.synthesis.max_unit_length == 0 {
            return Err(ReadaloudError::invalid_value(
                "synthesis.max_unit_length",
                "must be a positive integer",
            ));
        }
        if self.synthesis.jobs == 0 {
            return Err(ReadaloudError::invalid_value(
                "synthesis.jobs",
                "must be at least 1",
            ));
        }
        if self.synthesis.language.trim().is_empty() {
            return Err(ReadaloudError::invalid_value(
                "synthesis.language",
                "must not be empty",
            ));
        }
        self.assembly_settings().validate()
    }

    /// Serialize the effective configuration as TOML.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ReadaloudError::Other(format!("Failed to serialize config: {}", e)))
    }

    pub fn voice_config(&self) -> VoiceConfig {
        VoiceConfig {
            language: self.synthesis.language.clone(),
            voice: self.synthesis.voice.clone(),
        }
    }

    pub fn assembly_settings(&self) -> AssemblySettings {
        AssemblySettings {
            silence: Duration::from_millis(self.audio.silence_ms),
            gain_db: self.audio.gain_db,
            tempo: self.audio.tempo,
            sample_rate: self.audio.sample_rate,
        }
    }

    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions {
            preserve_links: self.markdown.preserve_links,
            preserve_emphasis: self.markdown.preserve_emphasis,
        }
    }
}
