//! Campus View - content editor for the school website
//!
//! Without a subcommand this opens the terminal admin editor for the news
//! ticker and popup banners. Subcommands give scriptable access to the same
//! content and to the header theme rules.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use campus_view::cli::{
    BannerArgs, CliError, ConfigArgs, ContentArgs, ExitCode, ResetArgs, ThemeArgs, TickerArgs,
};
use campus_view::config::Config;
use campus_view::constants::{APP_BINARY_NAME, APP_NAME};

/// Campus View - edit the school website's ticker and popup banners
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the terminal admin editor (the default)
    Edit,
    /// Show the stored content
    Content(ContentArgs),
    /// Edit news ticker lines
    Ticker(TickerArgs),
    /// Edit popup banner images
    Banner(BannerArgs),
    /// Restore the default ticker lines and banners
    Reset(ResetArgs),
    /// Derive the header theme from visible regions
    Theme(ThemeArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

/// Logs to stderr for headless commands.
fn init_cli_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

/// Logs to a file while the editor owns the terminal.
#[cfg(feature = "ratatui")]
fn init_editor_logging(verbose: bool) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::fs::{self, OpenOptions};
    use std::sync::Mutex;

    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir).context(format!(
        "Failed to create config directory: {}",
        dir.display()
    ))?;
    let path = dir.join(format!("{APP_BINARY_NAME}.log"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .context(format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(feature = "ratatui")]
fn run_editor(verbose: bool) -> anyhow::Result<()> {
    init_editor_logging(verbose)?;
    tracing::info!("{} v{} editor starting", APP_NAME, env!("CARGO_PKG_VERSION"));
    let config = Config::load()?;
    campus_view::tui::run_admin_editor(&config)
}

#[cfg(not(feature = "ratatui"))]
fn run_editor(_verbose: bool) -> anyhow::Result<()> {
    anyhow::bail!(
        "{} was built without the terminal editor; use the subcommands instead",
        APP_NAME
    )
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        None | Some(Commands::Edit) => {
            run_editor(cli.verbose).map_err(|e| CliError::io(format!("{e:#}")))
        }
        Some(command) => {
            init_cli_logging(cli.verbose);
            match command {
                Commands::Content(args) => args.execute(),
                Commands::Ticker(args) => args.execute(),
                Commands::Banner(args) => args.execute(),
                Commands::Reset(args) => args.execute(),
                Commands::Theme(args) => args.execute(),
                Commands::Config(args) => args.execute(),
                Commands::Edit => Ok(()),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code().code());
    }
    std::process::exit(ExitCode::Success.code());
}
