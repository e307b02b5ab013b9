//! Diagnostic command to check installation.

use dermabot_core::config::IssueSeverity;
use dermabot_core::{Config, Section};
use dermabot_store::ContentStore;

pub fn run(config: &Config) -> anyhow::Result<()> {
    println!("Running diagnostics...\n");

    // Check configuration
    println!("Configuration:");
    let result = config.validate();
    if result.issues.is_empty() {
        println!("  ✓ Valid");
    }
    for issue in &result.issues {
        let mark = match issue.severity {
            IssueSeverity::Error => "✗",
            IssueSeverity::Warning => "!",
        };
        println!("  {} {}: {}", mark, issue.field, issue.message);
    }

    // Check credentials
    println!("\nCredentials:");
    match config.require_token() {
        Ok(_) => println!("  ✓ BOT_TOKEN is set"),
        Err(_) => println!("  ✗ BOT_TOKEN is not set (the bot will refuse to start)"),
    }
    if config.bot.admins.is_empty() {
        println!("  ✗ No administrators configured");
    } else {
        let ids: Vec<String> = config.bot.admins.iter().map(|u| u.to_string()).collect();
        println!("  ✓ Administrators: {}", ids.join(", "));
    }

    // Check content files
    let store = ContentStore::from_config(&config.storage);
    println!("\nData directory: {:?}", store.data_dir());
    for section in Section::ALL {
        let path = store.collection_path(section);
        if !path.exists() {
            println!("  - {:<12} no file yet (section is empty)", section.key());
            continue;
        }
        match store.try_load(section) {
            Ok(collection) => println!("  ✓ {:<12} {} item(s)", section.key(), collection.len()),
            Err(e) => println!("  ✗ {:<12} {} (will be read as empty)", section.key(), e),
        }
    }

    // Check backups
    let rotator = store.backups();
    println!("\nBackup directory: {:?}", rotator.dir());
    match rotator.list_all() {
        Ok(snapshots) => println!(
            "  ✓ {} snapshot(s), keeping {} per file",
            snapshots.len(),
            rotator.max_backups()
        ),
        Err(e) => println!("  ✗ {}", e),
    }

    // Check log sink
    let log_dir = &config.logging.dir;
    println!("\nLog file: {:?}", config.logging.path());
    if log_dir.is_dir() {
        println!("  ✓ Directory exists");
    } else if log_dir.exists() {
        println!("  ! A plain file is in the way (it will be replaced on start)");
    } else {
        println!("  - Directory will be created on first run");
    }

    println!("\nDiagnostics complete.");
    Ok(())
}
