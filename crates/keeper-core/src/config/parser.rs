//! TOML parser with helpful error messages

use super::CONFIG_FILE_NAME;
use super::schema::KeeperConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load `keeper.toml` from the root project directory.
///
/// A missing file yields the default configuration.
pub fn load_root_config(project_dir: &Path) -> Result<KeeperConfig> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_dir.display());
        return Ok(KeeperConfig::default());
    }
    parse_keeper_toml(&path)
}

/// Parse keeper.toml with detailed error messages
pub fn parse_keeper_toml(path: &Path) -> Result<KeeperConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_keeper_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse keeper.toml content from string
///
/// Only the structure is checked here. Option values are validated by the
/// collaborators that consume them.
pub fn parse_keeper_toml_str(content: &str) -> Result<KeeperConfig> {
    toml::from_str(content).map_err(|e| enhance_toml_error(e, content))
}

/// Enhance TOML parsing errors with the offending lines
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.message().to_string();

    let line_hint = error
        .span()
        .map(|span| content[..span.start.min(content.len())].matches('\n').count() + 1);

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            context,
            error_msg
        )
    } else {
        anyhow::anyhow!("TOML parsing error: {}", error_msg)
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &KeeperConfig) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration to TOML")
}
