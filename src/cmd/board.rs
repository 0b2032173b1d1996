//! Database commands: `kanban init` and `kanban board`.

use anyhow::{Context, Result};
use std::path::Path;

use kanban::board::BoardStore;

pub fn cmd_init(db_path: &Path) -> Result<()> {
    BoardStore::new(db_path)
        .with_context(|| format!("Failed to initialize board database at {}", db_path.display()))?;
    println!("Board database initialized at {}", db_path.display());
    Ok(())
}

pub fn cmd_board(db_path: &Path) -> Result<()> {
    let store = BoardStore::new(db_path)
        .with_context(|| format!("Failed to open board database at {}", db_path.display()))?;
    let board = store.get_board()?;
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}
