//! Section inspection commands.

use dermabot_core::{Config, Section};
use dermabot_store::ContentStore;

use crate::SectionsAction;

pub fn handle(action: &SectionsAction, config: &Config) -> anyhow::Result<()> {
    let store = ContentStore::from_config(&config.storage);
    match action {
        SectionsAction::List => list_sections(&store),
        SectionsAction::Show { section } => {
            let section: Section = section.parse()?;
            show_section(&store, section);
        }
    }
    Ok(())
}

fn list_sections(store: &ContentStore) {
    println!("{:<12} {:>5}  {:<28} {}", "KEY", "ITEMS", "LABEL", "FILE");
    for section in Section::ALL {
        let collection = store.load(section);
        println!(
            "{:<12} {:>5}  {:<28} {}",
            section.key(),
            collection.len(),
            section.admin_label(),
            store.collection_path(section).display()
        );
    }
}

fn show_section(store: &ContentStore, section: Section) {
    let collection = store.load(section);
    println!("{} ({})", section.menu_label(), store.collection_path(section).display());
    if collection.is_empty() {
        println!("  {}", section.empty_notice());
        return;
    }
    for item in &collection.items {
        println!("  {:>4}. {}", item.id, item.name);
    }
}
