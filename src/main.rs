use anyhow::Result;
use owo_colors::OwoColorize;
use readaloud::app::{print_languages, run_clean_command, run_narrate_command};
use readaloud::cli::{Commands, ConfigAction};
use readaloud::config::Config;
use readaloud::error::ReadaloudError;
use readaloud::text::markdown::MarkdownOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = readaloud::cli::parse();
    readaloud::logging::init(cli.verbose, cli.quiet);

    match &cli.command {
        None => {
            let mut config = load_config(cli.config.as_deref())?;
            cli.apply_overrides(&mut config);
            match run_narrate_command(config, &cli.src, &cli.output, cli.quiet).await {
                Ok(()) => {}
                Err(ReadaloudError::Cancelled) => {
                    eprintln!("{}", "Interrupted; no output written".yellow());
                    std::process::exit(130);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Clean {
            src,
            output,
            preserve_links,
            preserve_emphasis,
        }) => {
            run_clean_command(
                src,
                output,
                MarkdownOptions {
                    preserve_links: *preserve_links,
                    preserve_emphasis: *preserve_emphasis,
                },
            )?;
        }
        Some(Commands::Languages) => {
            println!("Known language codes:");
            print_languages();
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                *shell,
                &mut readaloud::cli::command(),
                "readaloud",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/readaloud/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides are applied on top in every case.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Handle configuration commands.
fn handle_config_command(
    action: &ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Dump => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_display_toml()?);
        }
    }
    Ok(())
}
