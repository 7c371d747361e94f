use anyhow::Result;

use crate::cli::open_db;
use crate::fmt::percent;
use crate::settings::load_settings;
use crate::suggest::{SqliteMappingStore, SuggestionEngine};

pub fn run(description: &str, db: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let conn = open_db(db)?;
    let engine = SuggestionEngine::new(SqliteMappingStore::new(&conn), settings.suggestion_threshold);

    match engine.suggest(description)? {
        Some(s) => println!(
            "{} / {} (confidence {})",
            s.category,
            s.subcategory,
            percent(s.confidence)
        ),
        None => println!("No suggestion."),
    }
    Ok(())
}
