//! News ticker CLI commands.

use crate::cli::common::{open_session, print_json, save_session, CliError, CliResult};
use clap::{Args, Subcommand};

/// News ticker commands
#[derive(Args, Debug)]
pub struct TickerArgs {
    #[command(subcommand)]
    command: TickerCommand,
}

#[derive(Subcommand, Debug)]
enum TickerCommand {
    /// List ticker lines
    List(TickerListArgs),
    /// Append a ticker line
    Add(TickerAddArgs),
    /// Replace the text of a ticker line
    Set(TickerSetArgs),
    /// Remove a ticker line
    Remove(TickerRemoveArgs),
}

/// List ticker lines
#[derive(Args, Debug)]
pub struct TickerListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Append a ticker line
#[derive(Args, Debug)]
pub struct TickerAddArgs {
    /// Line text (a placeholder is used when omitted)
    #[arg(value_name = "TEXT")]
    text: Option<String>,
}

/// Replace the text of a ticker line
#[derive(Args, Debug)]
pub struct TickerSetArgs {
    /// Zero-based line index
    #[arg(value_name = "INDEX")]
    index: usize,

    /// New text
    #[arg(value_name = "TEXT")]
    text: String,
}

/// Remove a ticker line
#[derive(Args, Debug)]
pub struct TickerRemoveArgs {
    /// Zero-based line index
    #[arg(value_name = "INDEX")]
    index: usize,
}

impl TickerArgs {
    /// Execute ticker subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            TickerCommand::List(args) => args.execute(),
            TickerCommand::Add(args) => args.execute(),
            TickerCommand::Set(args) => args.execute(),
            TickerCommand::Remove(args) => args.execute(),
        }
    }
}

impl TickerListArgs {
    /// Execute list command
    pub fn execute(&self) -> CliResult<()> {
        let session = open_session()?;

        if self.json {
            return print_json(&session.ticker_lines());
        }

        if session.ticker_lines().is_empty() {
            println!("No ticker lines.");
        }
        for (index, line) in session.ticker_lines().iter().enumerate() {
            println!("[{index}] {line}");
        }
        Ok(())
    }
}

impl TickerAddArgs {
    /// Execute add command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;

        let index = session.add_ticker_line();
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(CliError::validation("Ticker text cannot be empty"));
            }
            session.update_ticker_line(index, text.as_str())?;
        }

        save_session(&mut session)?;
        println!("Added ticker line [{index}]");
        Ok(())
    }
}

impl TickerSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;
        session.update_ticker_line(self.index, self.text.as_str())?;
        save_session(&mut session)?;
        println!("Updated ticker line [{}]", self.index);
        Ok(())
    }
}

impl TickerRemoveArgs {
    /// Execute remove command
    pub fn execute(&self) -> CliResult<()> {
        let mut session = open_session()?;
        let removed = session.remove_ticker_line(self.index)?;
        save_session(&mut session)?;
        println!("Removed ticker line [{}]: {}", self.index, removed);
        Ok(())
    }
}
