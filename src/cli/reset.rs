//! Reset command.

use crate::cli::common::{open_session, CliError, CliResult};
use crate::services::Confirmation;
use clap::Args;

/// Restore the default ticker lines and banner images
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm that saved content should be discarded
    #[arg(long)]
    yes: bool,
}

impl ResetArgs {
    /// Execute reset command
    pub fn execute(&self) -> CliResult<()> {
        if !self.yes {
            return Err(CliError::validation(
                "Reset discards all saved ticker lines and banners. Re-run with --yes to confirm.",
            ));
        }

        let mut session = open_session()?;
        session.reset_to_defaults(Confirmation::from(self.yes))?;

        println!(
            "Content reset to defaults ({} ticker lines, {} banners).",
            session.ticker_lines().len(),
            session.banners().len()
        );
        Ok(())
    }
}
