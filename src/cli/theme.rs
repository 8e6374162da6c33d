//! Theme derivation command.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::models::VisibilitySet;
use crate::services::ThemeRules;
use clap::Args;
use serde::Serialize;

/// Show the header theme for a set of visible regions
#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Comma-separated ids of the regions currently in view
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    visible: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct ThemeOutput {
    theme: String,
    visible: Vec<String>,
}

impl ThemeArgs {
    /// Execute theme command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;
        let regions = config.regions.named_regions();

        let mut visibility: VisibilitySet = regions.iter().map(|r| (r.id.clone(), false)).collect();
        let mut visible = Vec::new();
        for id in self.visible.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            if !visibility.contains(id) {
                return Err(CliError::validation(format!(
                    "Unknown region '{}'. Tracked regions: {}",
                    id,
                    regions
                        .iter()
                        .map(|r| r.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
            visibility.set(id.into(), true);
            visible.push(id.to_string());
        }

        let theme = ThemeRules::from_regions(&regions).derive(&visibility);

        if self.json {
            return print_json(&ThemeOutput {
                theme: theme.to_string(),
                visible,
            });
        }

        println!("{theme}");
        Ok(())
    }
}
