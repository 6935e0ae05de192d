//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use invx_core::models::config::InvxConfig;
use invx_core::{AnalyzeDocumentResponse, Block, InvoiceExtractor, InvoiceRecord, TextInvoiceParser};

/// Load configuration from `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvxConfig> {
    if let Some(path) = config_path {
        return InvxConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return Ok(InvxConfig::from_file(&default_path)?);
    }

    Ok(InvxConfig::default())
}

/// A decoded input file.
pub enum Source {
    /// Already-recognized OCR text.
    Text(String),
    /// Blocks of a saved analysis-service response.
    Blocks(Vec<Block>),
}

/// Read an input file; `.json` files are analysis responses, anything else is text.
pub fn read_source(path: &Path) -> anyhow::Result<Source> {
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let response = AnalyzeDocumentResponse::from_json(&content)?;
        debug!("Decoded {} blocks from {}", response.blocks.len(), path.display());
        Ok(Source::Blocks(response.blocks))
    } else {
        Ok(Source::Text(content))
    }
}

/// Extract a record from any supported input file.
pub fn extract_record(path: &Path, parser: &TextInvoiceParser) -> anyhow::Result<InvoiceRecord> {
    Ok(match read_source(path)? {
        Source::Text(text) => parser.extract_from_text(&text),
        Source::Blocks(blocks) => parser.extract_from_blocks(&blocks),
    })
}
