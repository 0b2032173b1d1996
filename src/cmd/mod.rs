//! CLI command implementations.
//!
//! | Module   | Commands handled  |
//! |----------|-------------------|
//! | `serve`  | `Serve`           |
//! | `board`  | `Init`, `Board`   |
//! | `config` | `Config`          |

pub mod board;
pub mod config;
pub mod serve;

use anyhow::Result;
use std::path::Path;

use kanban::config::KanbanToml;

pub use board::{cmd_board, cmd_init};
pub use config::cmd_config;
pub use serve::cmd_serve;

/// Resolve settings (file, then env, then `--db-path`) and start logging.
pub fn prepare(config_path: &Path, db_path: Option<&Path>, verbose: bool) -> Result<KanbanToml> {
    let settings = load_settings(config_path, db_path)?;
    kanban::telemetry::init_tracing(&settings.logging, verbose)?;
    tracing::debug!(config = %config_path.display(), db = %settings.database.path.display(), "settings loaded");
    Ok(settings)
}

pub fn load_settings(config_path: &Path, db_path: Option<&Path>) -> Result<KanbanToml> {
    let mut settings = KanbanToml::load_or_default(config_path)?;
    settings.apply_env_overrides()?;
    if let Some(path) = db_path {
        settings.database.path = path.to_path_buf();
    }
    Ok(settings)
}
