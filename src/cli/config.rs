//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::{Config, ThemeMode};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
    /// Print the config file location
    Path,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Directory holding persisted content
    #[arg(long, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Directory saved content is mirrored into
    #[arg(long, value_name = "DIR")]
    mirror_dir: Option<PathBuf>,

    /// Maximum banner upload size in bytes
    #[arg(long, value_name = "BYTES")]
    max_upload_bytes: Option<u64>,

    /// Theme mode (auto, light, or dark)
    #[arg(long, value_name = "MODE")]
    theme: Option<String>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    paths: PathsOutput,
    regions: Vec<RegionOutput>,
    uploads: UploadsOutput,
    editor: EditorOutput,
    ui: UiOutput,
}

#[derive(Serialize, Debug)]
struct PathsOutput {
    storage_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_mirror_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_outbox: Option<String>,
}

#[derive(Serialize, Debug)]
struct RegionOutput {
    id: String,
    threshold: f64,
    groups: Vec<String>,
}

#[derive(Serialize, Debug)]
struct UploadsOutput {
    max_bytes: u64,
}

#[derive(Serialize, Debug)]
struct EditorOutput {
    save_timeout_ms: u64,
}

#[derive(Serialize, Debug)]
struct UiOutput {
    theme: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
            ConfigCommand::Path => {
                let path = Config::config_file_path()
                    .map_err(|e| CliError::io(format!("Failed to locate config file: {e}")))?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e}")))?;

        if self.json {
            output_json(&config)?;
        } else {
            output_human_readable(&config)?;
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.storage_dir.is_none()
            && self.mirror_dir.is_none()
            && self.max_upload_bytes.is_none()
            && self.theme.is_none()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --storage-dir, --mirror-dir, --max-upload-bytes, or --theme",
            ));
        }

        let mut config = Config::load().unwrap_or_else(|_| Config::default());

        if let Some(path) = &self.storage_dir {
            std::fs::create_dir_all(path).map_err(|e| {
                CliError::io(format!(
                    "Failed to create storage directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
            config.paths.storage_dir = Some(path.clone());
        }

        if let Some(path) = &self.mirror_dir {
            config.paths.remote_mirror_dir = Some(path.clone());
        }

        if let Some(max_bytes) = self.max_upload_bytes {
            if max_bytes == 0 {
                return Err(CliError::validation(
                    "Maximum upload size must be greater than zero",
                ));
            }
            config.uploads.max_bytes = max_bytes;
        }

        if let Some(theme_str) = &self.theme {
            let theme = match theme_str.to_lowercase().as_str() {
                "auto" => ThemeMode::Auto,
                "light" => ThemeMode::Light,
                "dark" => ThemeMode::Dark,
                _ => {
                    return Err(CliError::validation(
                        "Invalid theme mode. Must be 'auto', 'light', or 'dark'",
                    ))
                }
            };
            config.ui.theme_mode = theme;
        }

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

fn storage_dir_display(config: &Config) -> CliResult<String> {
    config
        .storage_dir()
        .map(|dir| dir.to_string_lossy().to_string())
        .map_err(|e| CliError::io(format!("Failed to resolve storage directory: {e}")))
}

/// Output configuration in JSON format
fn output_json(config: &Config) -> CliResult<()> {
    let output = ConfigOutput {
        paths: PathsOutput {
            storage_dir: storage_dir_display(config)?,
            remote_mirror_dir: config
                .paths
                .remote_mirror_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            contact_outbox: config
                .paths
                .contact_outbox
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        },
        regions: config
            .regions
            .named_regions()
            .into_iter()
            .map(|region| RegionOutput {
                id: region.id.to_string(),
                threshold: region.threshold,
                groups: region.groups,
            })
            .collect(),
        uploads: UploadsOutput {
            max_bytes: config.uploads.max_bytes,
        },
        editor: EditorOutput {
            save_timeout_ms: config.editor.save_timeout_ms,
        },
        ui: UiOutput {
            theme: format!("{:?}", config.ui.theme_mode).to_lowercase(),
        },
    };

    print_json(&output)
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) -> CliResult<()> {
    println!("Storage directory: {}", storage_dir_display(config)?);
    match &config.paths.remote_mirror_dir {
        Some(dir) => println!("Remote mirror:     {}", dir.display()),
        None => println!("Remote mirror:     (disabled)"),
    }
    match &config.paths.contact_outbox {
        Some(path) => println!("Contact outbox:    {}", path.display()),
        None => println!("Contact outbox:    (log only)"),
    }
    println!("Max upload:        {} bytes", config.uploads.max_bytes);
    println!("Save timeout:      {} ms", config.editor.save_timeout_ms);
    println!(
        "UI theme:          {}",
        format!("{:?}", config.ui.theme_mode).to_lowercase()
    );
    println!();
    println!("Tracked regions:");
    for region in config.regions.named_regions() {
        let groups = if region.groups.is_empty() {
            String::new()
        } else {
            format!(" [{}]", region.groups.join(", "))
        };
        println!("  {} (threshold {}){}", region.id, region.threshold, groups);
    }
    Ok(())
}
