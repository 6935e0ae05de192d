//! Config command: inspect and edit the JSON configuration file.
//!
//! Keys are dotted paths into the serialized [`InvxConfig`]
//! (`extraction.apply_ocr_repairs`, `output.format`). Every write is checked
//! by building the parser and resolving the output format before it lands
//! on disk.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use invx_core::{InvxConfig, TextInvoiceParser};

use super::output::OutputFormat;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the active configuration and where it came from
    Show,

    /// Write a configuration file with default values
    Init {
        /// Output path (default: the user config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, e.g. "extraction.address_keywords"
    Get { key: String },

    /// Change one value; the value is parsed as JSON, else taken as a string
    Set { key: String, value: String },
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = ConfigFile::open(config_path)?;

    match args.command {
        ConfigCommand::Show => {
            let origin = if file.exists { "" } else { " (not created, showing defaults)" };
            eprintln!("{} {}{}", style("ℹ").blue(), file.path.display(), origin);
            println!("{}", serde_json::to_string_pretty(&file.config)?);
        }
        ConfigCommand::Init { output, force } => {
            let path = output.unwrap_or(file.path);
            if path.exists() && !force {
                anyhow::bail!("Config file already exists at {}. Use --force to overwrite.", path.display());
            }
            ConfigFile::write(&path, &InvxConfig::default())?;
            println!("{} Created configuration file at {}", style("✓").green(), path.display());
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(&file.config)?;
            let value = json
                .pointer(&pointer(&key))
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let config = with_value(&file.config, &key, value.clone())?;
            ConfigFile::write(&file.path, &config)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
    }

    Ok(())
}

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invx")
        .join("config.json")
}

/// The configuration file the command operates on, loaded or defaulted.
struct ConfigFile {
    path: PathBuf,
    config: InvxConfig,
    exists: bool,
}

impl ConfigFile {
    /// `--config` when given, else the user file.
    fn open(config_path: Option<&str>) -> anyhow::Result<Self> {
        let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);
        let exists = path.exists();
        let config = if exists {
            InvxConfig::from_file(&path)?
        } else {
            InvxConfig::default()
        };

        debug!("Config file {} (exists: {})", path.display(), exists);
        Ok(Self { path, config, exists })
    }

    fn write(path: &std::path::Path, config: &InvxConfig) -> anyhow::Result<()> {
        check(config)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save(path)?;
        Ok(())
    }
}

/// Reject configurations the process and batch commands could not run with.
fn check(config: &InvxConfig) -> anyhow::Result<()> {
    TextInvoiceParser::from_config(&config.extraction)?;
    OutputFormat::resolve(None, &config.output)?;
    Ok(())
}

/// Copy of `config` with the value at dotted `key` replaced.
fn with_value(config: &InvxConfig, key: &str, value: Value) -> anyhow::Result<InvxConfig> {
    let mut json = serde_json::to_value(config)?;
    let slot = json
        .pointer_mut(&pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;

    serde_json::from_value(json).map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

/// `"output.format"` → `"/output/format"`
fn pointer(key: &str) -> String {
    key.split('.').map(|part| format!("/{}", part)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pointer() {
        assert_eq!(pointer("output.format"), "/output/format");
        assert_eq!(pointer("extraction"), "/extraction");
    }

    #[test]
    fn test_with_value() {
        let config = InvxConfig::default();

        let updated = with_value(&config, "extraction.enable_template_override", Value::Bool(true)).unwrap();
        assert!(updated.extraction.enable_template_override);

        assert!(with_value(&config, "output.nonexistent", Value::Bool(true)).is_err());
        assert!(with_value(&config, "output.pretty", Value::String("yes".into())).is_err());
    }

    #[test]
    fn test_check_rejects_unknown_format() {
        let mut config = InvxConfig::default();
        assert!(check(&config).is_ok());

        config.output.format = "xml".to_string();
        assert!(check(&config).is_err());
    }
}
