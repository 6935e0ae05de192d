//! Process command - extract fields from a single input file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use invx_core::{GraphKeyValueExtractor, InvoiceExtractor, InvoiceParser, TextInvoiceParser};

use super::output::{format_graph, format_record, OutputFormat};
use super::{load_config, read_source, Source};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR text, or a .json analysis response)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// For analysis responses, map key/value pairs onto an invoice record
    #[arg(long)]
    record: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// Enable the known-template override stage
    #[arg(long)]
    template_override: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.template_override {
        config.extraction.enable_template_override = true;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = TextInvoiceParser::from_config(&config.extraction)?;
    let format = OutputFormat::resolve(args.format, &config.output)?;
    let pretty = args.pretty || config.output.pretty;

    let source = read_source(&args.input)
        .with_context(|| format!("Processing failed for {}", args.input.display()))?;

    let (output, warnings) = match source {
        Source::Blocks(blocks) if !args.record => {
            let extraction = GraphKeyValueExtractor::new(&blocks).extract();
            (format_graph(&extraction, format, pretty)?, Vec::new())
        }
        Source::Blocks(blocks) => {
            let record = parser.extract_from_blocks(&blocks);
            let warnings = record.validate();
            (format_record(&record, format, pretty)?, warnings)
        }
        Source::Text(text) => {
            let result = parser.parse(&text);
            if let Some(name) = &result.template_override {
                eprintln!(
                    "{} Input replaced by known template '{}'",
                    style("!").yellow(),
                    name
                );
            }
            (format_record(&result.record, format, pretty)?, result.warnings)
        }
    };

    if args.validate {
        if warnings.is_empty() {
            eprintln!("{} No validation issues", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &warnings {
                eprintln!("  - {}", issue);
            }
        }
    }

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
