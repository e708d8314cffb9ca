//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let mut root = toml::Value::try_from(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

            set_key(&mut root, key, value)?;

            // Re-validate before writing anything
            let updated: Settings = root
                .try_into()
                .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))?;
            updated.save()?;

            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!(
                "Config saved to {}",
                Settings::default_config_path().display()
            ));
        }

        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }
    }

    Ok(())
}

/// Set a dotted key (e.g. "chunking.target_word_count") in a TOML tree.
fn set_key(root: &mut toml::Value, key: &str, value: &str) -> Result<()> {
    let mut current = root;
    let parts: Vec<&str> = key.split('.').collect();

    for part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Unknown config section: {}", part))?;
    }

    let last = parts
        .last()
        .ok_or_else(|| anyhow::anyhow!("Empty config key"))?;
    let existing = current
        .get(last)
        .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;

    // Coerce the new value to the type of the existing one
    let new_value = match existing {
        toml::Value::Integer(_) => toml::Value::Integer(value.parse()?),
        toml::Value::Float(_) => toml::Value::Float(value.parse()?),
        toml::Value::Boolean(_) => toml::Value::Boolean(value.parse()?),
        _ => toml::Value::String(value.to_string()),
    };

    current
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Config key '{}' is not settable", key))?
        .insert(last.to_string(), new_value);

    Ok(())
}
