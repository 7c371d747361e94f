use std::path::PathBuf;

use anyhow::Result;

use crate::db::{get_connection, init_db};
use crate::settings::{save_settings, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;

    let db_path = dir.join("tally.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized {}", db_path.display());
    Ok(())
}
