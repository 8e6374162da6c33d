//! Content inspection commands.

use crate::cli::common::{display_source, open_session, print_json, CliResult};
use crate::services::SessionState;
use clap::{Args, Subcommand};
use serde::Serialize;

/// Content inspection commands
#[derive(Args, Debug)]
pub struct ContentArgs {
    #[command(subcommand)]
    command: ContentCommand,
}

#[derive(Subcommand, Debug)]
enum ContentCommand {
    /// Display the saved ticker lines and banner images
    Show(ContentShowArgs),
}

/// Display the saved ticker lines and banner images
#[derive(Args, Debug)]
pub struct ContentShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ContentOutput {
    state: SessionState,
    ticker_lines: Vec<String>,
    banner_images: Vec<BannerOutput>,
}

#[derive(Serialize, Debug)]
struct BannerOutput {
    index: usize,
    name: String,
    source: String,
    inline: bool,
}

impl ContentArgs {
    /// Execute content subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ContentCommand::Show(args) => args.execute(),
        }
    }
}

impl ContentShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let session = open_session()?;

        if self.json {
            let output = ContentOutput {
                state: session.state(),
                ticker_lines: session.ticker_lines().to_vec(),
                banner_images: session
                    .banners()
                    .iter()
                    .enumerate()
                    .map(|(index, banner)| BannerOutput {
                        index,
                        name: banner.name.clone(),
                        source: banner.source.clone(),
                        inline: banner.is_inline(),
                    })
                    .collect(),
            };
            return print_json(&output);
        }

        println!("Ticker lines ({}):", session.ticker_lines().len());
        for (index, line) in session.ticker_lines().iter().enumerate() {
            println!("  [{index}] {line}");
        }
        println!();
        println!("Banner images ({}):", session.banners().len());
        for (index, banner) in session.banners().iter().enumerate() {
            println!("  [{index}] {} ({})", banner.name, display_source(&banner.source));
        }

        Ok(())
    }
}
