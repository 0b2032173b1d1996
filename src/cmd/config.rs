//! Configuration view and validation commands: `kanban config`.

use anyhow::Result;
use std::path::Path;

use kanban::config::KanbanToml;

use super::super::ConfigCommands;

fn print_settings(toml: &KanbanToml) {
    println!("[server]");
    println!("  host = \"{}\"", toml.server.host);
    println!("  port = {}", toml.server.port);
    println!("  cors_permissive = {}", toml.server.cors_permissive);
    println!();
    println!("[database]");
    println!("  path = \"{}\"", toml.database.path.display());
    println!();
    println!("[logging]");
    println!("  level = \"{}\"", toml.logging.level);
    println!("  format = \"{}\"", toml.logging.format);
    println!();
}

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Kanban Configuration");
            println!("====================");
            println!();

            let mut toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                KanbanToml::load(config_path)?
            } else {
                println!("No kanban.toml found at {}", config_path.display());
                println!("Using default configuration.");
                KanbanToml::default()
            };
            println!();

            toml.apply_env_overrides()?;
            println!("Effective values (with env overrides):");
            print_settings(&toml);

            if !config_path.exists() {
                println!("Run 'kanban config init' to create a kanban.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No kanban.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = KanbanToml::load(config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("kanban.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            KanbanToml::default().save(config_path)?;

            println!("Created kanban.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port, cors_permissive");
            println!("  - [database] path");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
