//! Rendering of extraction results.

use clap::ValueEnum;

use invx_core::models::config::OutputConfig;
use invx_core::{GraphExtraction, InvoiceRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// The flag if given, otherwise the configured default.
    pub fn resolve(flag: Option<OutputFormat>, config: &OutputConfig) -> anyhow::Result<Self> {
        match flag {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&config.format, true)
                .map_err(|_| anyhow::anyhow!("Unknown output format in config: {}", config.format)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Column headers of a record row.
pub const RECORD_COLUMNS: [&str; 12] = [
    "seller_name",
    "buyer_name",
    "buyer_address",
    "ship_to_name",
    "ship_to_address",
    "invoice_number",
    "invoice_date",
    "due_date",
    "subtotal",
    "tax",
    "total",
    "line_items",
];

pub fn format_record(record: &InvoiceRecord, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_record_csv(record),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

pub fn format_graph(extraction: &GraphExtraction, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(extraction)?),
        OutputFormat::Json => Ok(serde_json::to_string(extraction)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["key", "value"])?;
            for (key, value) in extraction.key_values.iter() {
                wtr.write_record([key, value])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Key/value pairs:\n");
            for (key, value) in extraction.key_values.iter() {
                output.push_str(&format!("  {}: {}\n", key, value));
            }
            output.push_str(&format!("\nLines: {}\n", extraction.lines.len()));
            for line in &extraction.lines {
                output.push_str(&format!("  {}\n", line));
            }
            Ok(output)
        }
    }
}

/// Record fields in [`RECORD_COLUMNS`] order, missing values as "Not found".
pub fn record_row(record: &InvoiceRecord) -> Vec<String> {
    let field = |value: &Option<String>| InvoiceRecord::display_field(value).to_string();

    vec![
        field(&record.seller_name),
        field(&record.buyer_name),
        field(&record.buyer_address),
        field(&record.ship_to_name),
        field(&record.ship_to_address),
        field(&record.invoice_number),
        field(&record.invoice_date),
        field(&record.due_date),
        field(&record.subtotal),
        field(&record.tax),
        field(&record.total),
        record.line_items.len().to_string(),
    ]
}

fn format_record_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(RECORD_COLUMNS)?;
    wtr.write_record(record_row(record))?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_record_text(record: &InvoiceRecord) -> String {
    let show = InvoiceRecord::display_field;
    let mut output = String::new();

    output.push_str(&format!("Seller:  {}\n", show(&record.seller_name)));
    output.push_str(&format!("Invoice: {}\n", show(&record.invoice_number)));
    output.push_str(&format!("Date:    {}\n", show(&record.invoice_date)));
    output.push_str(&format!("Due:     {}\n", show(&record.due_date)));
    output.push('\n');

    output.push_str("Bill to:\n");
    output.push_str(&format!("  {}\n", show(&record.buyer_name)));
    output.push_str(&format!("  {}\n", show(&record.buyer_address)));
    output.push_str("Ship to:\n");
    output.push_str(&format!("  {}\n", show(&record.ship_to_name)));
    output.push_str(&format!("  {}\n", show(&record.ship_to_address)));
    output.push('\n');

    output.push_str(&format!("Items ({}):\n", record.line_items.len()));
    for item in &record.line_items {
        output.push_str(&format!(
            "  {} x {} @ {} = {}\n",
            item.quantity, item.description, item.unit_price, item.line_total
        ));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal: {}\n", show(&record.subtotal)));
    output.push_str(&format!("  Tax:      {}\n", show(&record.tax)));
    output.push_str(&format!("  Total:    {}\n", show(&record.total)));

    output
}
