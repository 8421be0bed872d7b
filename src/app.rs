//! Narration application entry point.
//!
//! Wires the configured provider into the pipeline and handles everything
//! around it: reading the source, progress display, interruption and export.
//! Nothing is written unless the whole pipeline succeeds.

use crate::audio::export::{OutputFormat, OutputTarget, write_output};
use crate::config::{Config, ProviderKind};
use crate::defaults::{MP3_BITRATE_KBPS, SUPPORTED_LANGUAGES, language_name};
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineReport};
use crate::synth::command::CommandSynthesizer;
use crate::synth::orchestrator::CancelFlag;
use crate::synth::progress::{NoProgress, ProgressBarObserver, ProgressObserver};
use crate::synth::synthesizer::Synthesizer;
use crate::text::input::read_input;
use crate::text::markdown::{MarkdownNormalizer, MarkdownOptions, Normalizer};
use owo_colors::OwoColorize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the narrate command: read → normalize → chunk → synthesize → assemble → export.
///
/// # Arguments
/// * `config` - Effective configuration (file, env and CLI overrides applied)
/// * `src` - Input path, `-` for stdin
/// * `output` - Output path, `-` for stdout
/// * `quiet` - Suppress progress bar and summary
pub async fn run_narrate_command(
    config: Config,
    src: &str,
    output: &str,
    quiet: bool,
) -> Result<()> {
    config.validate()?;
    if let Some(message) = language_warning(&config.synthesis.language) {
        warn!("{}", message);
        if !quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        }
    }

    // Input problems are reported before any provider is contacted
    let text = read_input(src)?;
    let target = OutputTarget::parse(output);
    let format = OutputFormat::resolve(config.audio.format, &target);

    let synthesizer = build_synthesizer(&config)?;
    info!(provider = synthesizer.name(), "synthesizer ready");

    let cancel = CancelFlag::new();
    spawn_interrupt_handler(cancel.clone());

    let observer: Arc<dyn ProgressObserver> = if quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressBarObserver::new())
    };

    let pipeline = Pipeline::from_config(&config, synthesizer, cancel, observer)?;
    let result = pipeline.run(&text).await?;
    let bytes = result.assembly.encode(format)?;
    write_output(&target, &bytes)?;
    info!(%target, %format, bytes = bytes.len(), "exported");

    if !quiet {
        print_summary(&target, format, result.assembly.duration(), bytes.len(), &result.report);
    }
    Ok(())
}

/// Run the clean command: print the narration text without synthesizing it.
pub fn run_clean_command(src: &str, output: &str, options: MarkdownOptions) -> Result<()> {
    let text = read_input(src)?;
    let normalizer = MarkdownNormalizer::new(options);
    debug!(rules = ?normalizer.rule_names(), "normalizing");

    let mut cleaned = normalizer.normalize(&text);
    if !cleaned.is_empty() {
        cleaned.push('\n');
    }
    write_output(&OutputTarget::parse(output), cleaned.as_bytes())
}

/// Print the known language codes.
pub fn print_languages() {
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {:<4} {}", code, name);
    }
}

/// Warning text for a language code missing from the known list.
///
/// Region suffixes are ignored, so `en-US` counts as `en`. Unknown codes are
/// still passed to the provider.
pub fn language_warning(code: &str) -> Option<String> {
    let primary = code.split(['-', '_']).next().unwrap_or(code);
    if language_name(code).is_some() || language_name(primary).is_some() {
        return None;
    }
    Some(format!(
        "unknown language code '{}'; passing it to the provider as is (see `readaloud languages`)",
        code
    ))
}

/// Construct the synthesizer selected by `synthesis.provider`.
pub fn build_synthesizer(config: &Config) -> Result<Arc<dyn Synthesizer>> {
    let synthesis = &config.synthesis;
    match synthesis.provider {
        ProviderKind::Command => Ok(Arc::new(CommandSynthesizer::new(
            synthesis.command.program.clone(),
            synthesis.command.args.clone(),
        ))),
        #[cfg(feature = "http")]
        ProviderKind::Google => {
            let google = &synthesis.google;
            Ok(Arc::new(crate::synth::google::GoogleSynthesizer::new(
                &google.tld,
                google.slow,
                Duration::from_secs(google.timeout_secs),
            )?))
        }
        #[cfg(feature = "http")]
        ProviderKind::Openai => {
            let openai = &synthesis.openai;
            let api_key = std::env::var(&openai.api_key_env).unwrap_or_default();
            Ok(Arc::new(crate::synth::openai::OpenAiSynthesizer::new(
                &openai.endpoint,
                &openai.model,
                &openai.voice,
                api_key,
                Duration::from_secs(openai.timeout_secs),
            )?))
        }
        #[cfg(not(feature = "http"))]
        other => Err(crate::error::ReadaloudError::invalid_value(
            "synthesis.provider",
            format!("provider '{other}' requires the 'http' feature"),
        )),
    }
}

/// Cancel the run on Ctrl-C, and exit at once on a second Ctrl-C.
///
/// After the first signal units already in flight finish, nothing new is
/// submitted and no output is written.
fn spawn_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if handle_interrupts(tokio::signal::ctrl_c, cancel).await {
            eprintln!();
            eprintln!("{}", "Interrupted again, exiting".yellow());
            std::process::exit(130);
        }
    });
}

/// Wait for interrupts from `next_signal`.
///
/// The first one cancels the run. Returns `true` once a second one arrives,
/// `false` if the signal source fails first.
async fn handle_interrupts<S, F>(mut next_signal: S, cancel: CancelFlag) -> bool
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    eprintln!();
    eprintln!(
        "{}",
        "Interrupted, waiting for in-flight units (Ctrl-C again to exit)...".yellow()
    );
    cancel.cancel();

    next_signal().await.is_ok()
}

fn print_summary(
    target: &OutputTarget,
    format: OutputFormat,
    duration: Duration,
    size: usize,
    report: &PipelineReport,
) {
    for skipped in &report.skipped {
        eprintln!(
            "{} unit {} skipped: {}",
            "warning:".yellow().bold(),
            skipped.index,
            skipped.reason
        );
    }
    for excluded in &report.excluded {
        eprintln!(
            "{} unit {} excluded: {}",
            "warning:".yellow().bold(),
            excluded.index,
            excluded.reason
        );
    }

    let format = match format {
        OutputFormat::Mp3 => format!("mp3 {} kbit/s", MP3_BITRATE_KBPS),
        OutputFormat::Wav => format.to_string(),
    };
    eprintln!(
        "{} {} ({}, {}, {}, {}/{} units)",
        "Wrote".green().bold(),
        target,
        format,
        format_duration(duration),
        format_size(size),
        report.narrated(),
        report.units
    );
}

/// `75.25s` → `1m 15.2s`.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    let minutes = (secs / 60.0).floor() as u64;
    let rest = secs - (minutes * 60) as f64;
    if minutes == 0 {
        format!("{:.1}s", rest)
    } else {
        format!("{}m {:04.1}s", minutes, rest)
    }
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}
