//! Backup inspection commands.

use std::fs;

use chrono::{DateTime, Local};
use dermabot_core::Config;
use dermabot_store::ContentStore;

use crate::BackupsAction;

pub fn handle(action: &BackupsAction, config: &Config) -> anyhow::Result<()> {
    let store = ContentStore::from_config(&config.storage);
    let rotator = store.backups();

    match action {
        BackupsAction::List { basename } => {
            let snapshots = match basename {
                Some(name) => rotator.list(name)?,
                None => rotator.list_all()?,
            };

            println!(
                "Backup directory: {} (keeping {} per file)",
                rotator.dir().display(),
                rotator.max_backups()
            );
            if snapshots.is_empty() {
                println!("  No backups yet.");
                return Ok(());
            }

            for path in &snapshots {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match fs::metadata(path) {
                    Ok(meta) => {
                        let modified = meta
                            .modified()
                            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|_| "-".to_string());
                        println!("  {:<40} {:>8} B  {}", name, meta.len(), modified);
                    }
                    Err(_) => println!("  {}", name),
                }
            }
            println!("{} snapshot(s)", snapshots.len());
        }
    }
    Ok(())
}
