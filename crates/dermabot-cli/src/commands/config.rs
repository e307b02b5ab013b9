//! Configuration management commands.

use std::path::Path;

use dermabot_core::config::IssueSeverity;
use dermabot_core::Config;

use crate::ConfigAction;

pub fn handle(action: &ConfigAction, config: &Config, extra: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_display_toml()?);
            for issue in config.validate().issues {
                let tag = match issue.severity {
                    IssueSeverity::Error => "error",
                    IssueSeverity::Warning => "warning",
                };
                eprintln!("{}: {}: {}", tag, issue.field, issue.message);
            }
        }
        ConfigAction::Path => {
            println!("Sources, lowest precedence first:");
            println!("  {}", Config::config_dir().join("config.toml").display());
            println!("  ./dermabot.toml");
            if let Some(path) = extra {
                println!("  {}", path.display());
            }
            println!("  DERMABOT_* environment variables (nested keys use __)");
            println!("  BOT_TOKEN, ADMINS environment variables");
        }
    }
    Ok(())
}
