//! Configuration view and validation commands: `socialsync config`.

use std::path::Path;

use anyhow::Result;
use socialsync::config::{CONFIG_DIR, Config, SocialsyncToml, config_path};

use super::super::ConfigCommands;

pub fn cmd_config(
    project_dir: &Path,
    explicit: Option<&Path>,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_path(project_dir));

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Socialsync Configuration");
            println!("========================");
            println!();

            if path.exists() {
                println!("Config file: {}", path.display());
                println!();
                print_toml(&SocialsyncToml::load(&path)?);
            } else {
                println!("No socialsync.toml found at {}", path.display());
                println!();
                println!("Using default configuration:");
                print_toml(&SocialsyncToml::default());
                println!("Run 'socialsync config init' to create a socialsync.toml file.");
                println!();
            }

            // Show effective values (including env overrides)
            let config = Config::load(project_dir, explicit)?;
            println!("Effective values (with env overrides):");
            println!("  base_url = \"{}\"", config.remote.base_url);
            println!(
                "  token = {}",
                if config.remote.token.is_some() {
                    "(set)"
                } else {
                    "(none)"
                }
            );
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !path.exists() {
                println!("No socialsync.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = SocialsyncToml::load(&path)?;
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
            if path.exists() {
                println!("socialsync.toml already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            SocialsyncToml::default().save(&path)?;

            println!("Created socialsync.toml at {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [remote] base_url, timeout_secs, token");
            println!("  - [search] debounce_ms");
            println!("  - [logging] level, format");
            if explicit.is_none() {
                println!();
                println!("Add {}/ to .gitignore if it holds a token.", CONFIG_DIR);
            }
            println!();
        }
    }

    Ok(())
}

fn print_toml(toml: &SocialsyncToml) {
    println!("[remote]");
    println!("  base_url = \"{}\"", toml.remote.base_url);
    println!("  timeout_secs = {}", toml.remote.timeout_secs);
    if toml.remote.token.is_some() {
        println!("  token = (set)");
    }
    println!();
    println!("[search]");
    println!("  debounce_ms = {}", toml.search.debounce_ms);
    println!();
    println!("[logging]");
    println!("  level = \"{}\"", toml.logging.level);
    println!("  format = \"{}\"", toml.logging.format);
    println!();
}
