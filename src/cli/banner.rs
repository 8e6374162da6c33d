//! Popup banner CLI commands.

use crate::cli::common::{display_source, open_session, print_json, save_session, CliError, CliResult};
use crate::services::{ContentEditorSession, ImageUpload};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Popup banner commands
#[derive(Args, Debug)]
pub struct BannerArgs {
    #[command(subcommand)]
    command: BannerCommand,
}

#[derive(Subcommand, Debug)]
enum BannerCommand {
    /// List banner images
    List(BannerListArgs),
    /// Add a banner from an image file or URL
    Add(BannerAddArgs),
    /// Remove a banner
    Remove(BannerRemoveArgs),
    /// Replace a banner with another image file
    Replace(BannerReplaceArgs),
}

/// List banner images
#[derive(Args, Debug)]
pub struct BannerListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Add a banner from an image file or URL
#[derive(Args, Debug)]
pub struct BannerAddArgs {
    /// Image file to embed
    #[arg(value_name = "FILE", conflicts_with = "url", required_unless_present = "url")]
    file: Option<PathBuf>,

    /// Reference an already hosted image instead of embedding a file
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

/// Remove a banner
#[derive(Args, Debug)]
pub struct BannerRemoveArgs {
    /// Zero-based banner index
    #[arg(value_name = "INDEX")]
    index: usize,
}

/// Replace a banner with another image file
#[derive(Args, Debug)]
pub struct BannerReplaceArgs {
    /// Zero-based banner index
    #[arg(value_name = "INDEX")]
    index: usize,

    /// Replacement image file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Serialize, Debug)]
struct BannerOutput {
    index: usize,
    name: String,
    source: String,
}

impl BannerArgs {
    /// Execute banner subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            BannerCommand::List(args) => args.execute(),
            BannerCommand::Add(args) => args.execute(),
            BannerCommand::Remove(args) => args.execute(),
            BannerCommand::Replace(args) => args.execute(),
        }
    }
}

/// Banner ids only live for one session, so commands address banners by position.
fn banner_id(session: &ContentEditorSession, index: usize) -> CliResult<Uuid> {
    session
        .banners()
        .get(index)
        .map(|banner| banner.id)
        .ok_or_else(|| {
            CliError::validation(format!(
                "Banner {} does not exist ({} banners)",
                index,
                session.banners().len()
            ))
        })
}

fn read_upload(path: &Path) -> CliResult<ImageUpload> {
    if !path.exists() {
        return Err(CliError::validation(format!(
            "Image file not found: {}",
            path.display()
        )));
    }
    ImageUpload::from_path(path).map_err(|e| CliError::io(format!("{e:#}")))
}

impl BannerListArgs {
    /// Execute list command
    pub fn execute(&self) -> CliResult<()> {
        let session = open_session()?;

        if self.json {
            let output: Vec<BannerOutput> = session
                .banners()
                .iter()
                .enumerate()
                .map(|(index, banner)| BannerOutput {
                    index,
                    name: banner.name.clone(),
                    source: banner.source.clone(),
                })
                .collect();
            return print_json(&output);
        }

        if session.banners().is_empty() {
            println!("No banner images.");
        }
        for (index, banner) in session.banners().iter().enumerate() {
            println!("[{index}] {} ({})", banner.name, display_source(&banner.source));
        }
        Ok(())
    }
}

impl BannerAddArgs {
    /// Execute add command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;

        match (&self.file, &self.url) {
            (Some(path), _) => {
                let upload = read_upload(path)?;
                session.add_image(&upload)?;
            }
            (None, Some(url)) => {
                if url.trim().is_empty() {
                    return Err(CliError::validation("Banner URL cannot be empty"));
                }
                session.add_image_reference(url.trim())?;
            }
            (None, None) => {
                return Err(CliError::validation("Either FILE or --url must be given"));
            }
        }

        save_session(&mut session)?;
        println!("Added banner [{}]", session.banners().len() - 1);
        Ok(())
    }
}

impl BannerRemoveArgs {
    /// Execute remove command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;
        let id = banner_id(&session, self.index)?;
        let removed = session.remove_image(id)?;
        save_session(&mut session)?;
        println!("Removed banner [{}]: {}", self.index, removed.name);
        Ok(())
    }
}

impl BannerReplaceArgs {
    /// Execute replace command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;
        let id = banner_id(&session, self.index)?;
        let upload = read_upload(&self.file)?;
        session.replace_image(id, &upload)?;
        save_session(&mut session)?;
        println!("Replaced banner [{}]", self.index);
        Ok(())
    }
}
