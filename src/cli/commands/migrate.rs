//! `runnerd migrate [--down]`: apply or revert database migrations and
//! exit (spec.md §6).

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use crate::cli::output::table::render_fields;
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::database::DatabaseConnection;

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub direction: &'static str,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        render_fields(&[("direction", self.direction.to_string())], Some("direction"))
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "direction": self.direction })
    }
}

pub async fn handle_migrate(down: bool, config: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = match config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let conn = DatabaseConnection::new(&config.database.url, config.database.max_connections).await?;
    let direction = if down {
        conn.migrate_down().await?;
        "down"
    } else {
        conn.migrate().await?;
        "up"
    };

    output(&MigrateOutput { direction }, json_mode);
    Ok(())
}
