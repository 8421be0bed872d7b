//! Command-line interface for readaloud
//!
//! Provides argument parsing using clap derive macros.

use crate::audio::export::OutputFormat;
use crate::config::{Config, ProviderKind};
use crate::defaults;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Narrate text and Markdown into a single audio file
#[derive(Parser, Debug)]
#[command(
    name = "readaloud",
    version,
    about = "Narrate text and Markdown into a single audio file",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input text or Markdown file ("-" reads stdin)
    #[arg(value_name = "SRC", default_value = defaults::STDIO_PATH)]
    pub src: String,

    /// Output audio file ("-" writes to stdout)
    #[arg(short, long, value_name = "OUT", default_value = defaults::DEFAULT_OUTPUT)]
    pub output: String,

    /// Output format (mp3, wav); defaults to the output file extension
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Maximum characters per synthesis unit
    #[arg(long, value_name = "N")]
    pub chunk: Option<usize>,

    /// Playback speed factor (1.0 = unchanged)
    #[arg(long, value_name = "X")]
    pub speed: Option<f32>,

    /// Volume adjustment in dB
    #[arg(long, value_name = "DB", allow_hyphen_values = true)]
    pub gain: Option<f32>,

    /// Silence between units. Examples: 250, 250ms, 1s
    #[arg(long, value_name = "DURATION", value_parser = parse_silence_ms)]
    pub silence: Option<u64>,

    /// Language code passed to the provider (see `readaloud languages`)
    #[arg(long, value_name = "CODE")]
    pub lang: Option<String>,

    /// Provider-specific voice name
    #[arg(long, value_name = "VOICE")]
    pub voice: Option<String>,

    /// Synthesis provider (google, command, openai)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<ProviderKind>,

    /// Concurrent provider calls
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Skip Markdown normalization
    #[arg(long)]
    pub no_clean: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress logs, -vv: debug, -vvv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(chunk) = self.chunk {
            config.synthesis.max_unit_length = chunk;
        }
        if let Some(speed) = self.speed {
            config.audio.tempo = speed;
        }
        if let Some(gain) = self.gain {
            config.audio.gain_db = gain;
        }
        if let Some(silence) = self.silence {
            config.audio.silence_ms = silence;
        }
        if let Some(lang) = &self.lang {
            config.synthesis.language = lang.clone();
        }
        if let Some(voice) = &self.voice {
            config.synthesis.voice = voice.clone();
        }
        if let Some(provider) = self.provider {
            config.synthesis.provider = provider;
        }
        if let Some(jobs) = self.jobs {
            config.synthesis.jobs = jobs;
        }
        if self.no_clean {
            config.markdown.enabled = false;
        }
        if let Some(format) = self.format {
            config.audio.format = Some(format);
        }
    }
}

/// The clap command, reporting the build's git hash in `--version`.
pub fn command() -> clap::Command {
    Cli::command().version(crate::version_string())
}

/// Parse the process arguments, exiting on error or `--help`/`--version`.
pub fn parse() -> Cli {
    let matches = command().get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

/// Parse a silence duration into milliseconds.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`250ms`, `1s`, `1s 500ms`).
fn parse_silence_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the narration text after Markdown normalization
    Clean {
        /// Input file ("-" reads stdin)
        #[arg(value_name = "SRC", default_value = defaults::STDIO_PATH)]
        src: String,

        /// Output text file ("-" writes to stdout)
        #[arg(short, long, value_name = "OUT", default_value = defaults::STDIO_PATH)]
        output: String,

        /// Keep link markup
        #[arg(long)]
        preserve_links: bool,

        /// Keep bold, italic and strikethrough markup
        #[arg(long)]
        preserve_emphasis: bool,
    },

    /// List known language codes
    Languages,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration as TOML
    Dump,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_command() {
        let cli = Cli::try_parse_from(["readaloud"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.src, "-");
        assert_eq!(cli.output, "output.mp3");
        assert!(cli.format.is_none());
        assert!(cli.chunk.is_none());
        assert!(cli.speed.is_none());
        assert!(cli.gain.is_none());
        assert!(cli.silence.is_none());
        assert!(cli.lang.is_none());
        assert!(cli.voice.is_none());
        assert!(cli.provider.is_none());
        assert!(cli.jobs.is_none());
        assert!(!cli.no_clean);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_full_run() {
        let cli = Cli::try_parse_from([
            "readaloud",
            "notes.md",
            "-o",
            "notes.wav",
            "--chunk",
            "500",
            "--speed",
            "1.5",
            "--gain",
            "-3",
            "--silence",
            "400ms",
            "--lang",
            "en",
            "--voice",
            "en-us",
            "--provider",
            "command",
            "--jobs",
            "4",
            "--no-clean",
        ])
        .unwrap();

        assert_eq!(cli.src, "notes.md");
        assert_eq!(cli.output, "notes.wav");
        assert_eq!(cli.chunk, Some(500));
        assert_eq!(cli.speed, Some(1.5));
        assert_eq!(cli.gain, Some(-3.0));
        assert_eq!(cli.silence, Some(400));
        assert_eq!(cli.lang.as_deref(), Some("en"));
        assert_eq!(cli.voice.as_deref(), Some("en-us"));
        assert_eq!(cli.provider, Some(ProviderKind::Command));
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.no_clean);
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["readaloud", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_quiet_short_flag() {
        let cli = Cli::try_parse_from(["readaloud", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_silence_formats() {
        assert_eq!(parse_silence_ms("250"), Ok(250));
        assert_eq!(parse_silence_ms("250ms"), Ok(250));
        assert_eq!(parse_silence_ms("1s"), Ok(1000));
        assert_eq!(parse_silence_ms(" 2s 500ms "), Ok(2500));
        assert!(parse_silence_ms("soon").is_err());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = Cli::try_parse_from(["readaloud", "--provider", "polly"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_clean() {
        let cli =
            Cli::try_parse_from(["readaloud", "clean", "doc.md", "--preserve-links"]).unwrap();
        match cli.command {
            Some(Commands::Clean {
                src,
                output,
                preserve_links,
                preserve_emphasis,
            }) => {
                assert_eq!(src, "doc.md");
                assert_eq!(output, "-");
                assert!(preserve_links);
                assert!(!preserve_emphasis);
            }
            _ => panic!("Expected Clean command"),
        }
    }

    #[test]
    fn test_parse_languages() {
        let cli = Cli::try_parse_from(["readaloud", "languages"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Languages)));
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["readaloud", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Path
            })
        ));

        let cli = Cli::try_parse_from(["readaloud", "config", "dump"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Dump
            })
        ));
    }

    #[test]
    fn test_config_requires_subcommand() {
        let err = Cli::try_parse_from(["readaloud", "config"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from(["readaloud", "languages", "--config", "/tmp/config.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["readaloud", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["readaloud", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_version_includes_build_hash() {
        let cmd = command();
        assert_eq!(cmd.get_version(), Some(crate::version_string().as_str()));

        let err = command()
            .try_get_matches_from(["readaloud", "--version"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(&crate::version_string()));
    }

    #[test]
    fn test_parse_format() {
        let cli = Cli::try_parse_from(["readaloud", "--format", "wav", "-o", "-"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Wav));

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.audio.format, Some(OutputFormat::Wav));

        assert!(Cli::try_parse_from(["readaloud", "--format", "flac"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "readaloud",
            "--speed",
            "1.0",
            "--gain",
            "0",
            "--lang",
            "en",
            "--no-clean",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.audio.tempo, 1.0);
        assert_eq!(config.audio.gain_db, 0.0);
        assert_eq!(config.synthesis.language, "en");
        assert!(!config.markdown.enabled);
        // Untouched values keep their defaults
        assert_eq!(config.audio.silence_ms, 250);
        assert_eq!(config.synthesis.max_unit_length, 1800);
    }
}
