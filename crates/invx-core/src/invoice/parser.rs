//! Text-path invoice parser and the two-input extractor built on it.

use std::borrow::Cow;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::graph::{record_from_key_values, GraphKeyValueExtractor};
use crate::models::block::Block;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::InvoiceRecord;

use super::rules::{
    repair_ocr_text, resolve_tax, LineClassifier, LineItemParser, ScalarField, ScalarRule,
    SectionKind,
};
use super::template::TemplateOverride;
use super::InvoiceExtractor;

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Text the rules ran on, after override and repairs.
    pub text: String,
    /// Name of the known template that replaced the input, if any.
    pub template_override: Option<String>,
    /// Validation warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice from text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Rule-based parser for raw OCR text.
#[derive(Debug, Clone)]
pub struct TextInvoiceParser {
    classifier: LineClassifier,
    scalars: Vec<ScalarRule>,
    items: LineItemParser,
    /// Whether to repair OCR token merges first.
    repair_ocr: bool,
    /// Known-template stage, absent unless enabled.
    template_override: Option<TemplateOverride>,
}

impl TextInvoiceParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::new(),
            scalars: ScalarRule::defaults(),
            items: LineItemParser::new(),
            repair_ocr: true,
            template_override: None,
        }
    }

    /// Build a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut parser = Self::new()
            .with_ocr_repairs(config.apply_ocr_repairs)
            .with_line_items(LineItemParser::with_keywords(&config.address_keywords)?);

        if config.enable_template_override {
            parser = parser.with_template_override(TemplateOverride::new(config.templates.clone()));
        }

        Ok(parser)
    }

    /// Set OCR repairs.
    pub fn with_ocr_repairs(mut self, repair: bool) -> Self {
        self.repair_ocr = repair;
        self
    }

    /// Replace the line item parser.
    pub fn with_line_items(mut self, items: LineItemParser) -> Self {
        self.items = items;
        self
    }

    /// Enable the known-template override stage.
    pub fn with_template_override(mut self, stage: TemplateOverride) -> Self {
        self.template_override = Some(stage);
        self
    }

    /// Run override and repairs, returning the text the rules should see.
    fn preprocess<'t>(&'t self, text: &'t str) -> (Cow<'t, str>, Option<String>) {
        let (text, template) = match self.template_override.as_ref().and_then(|s| s.apply(text)) {
            Some(template) => (template.replacement.as_str(), Some(template.name.clone())),
            None => (text, None),
        };

        let text = if self.repair_ocr {
            repair_ocr_text(text)
        } else {
            Cow::Borrowed(text)
        };

        (text, template)
    }

    /// Run the rule tables over already preprocessed text.
    fn extract_record(&self, text: &str) -> InvoiceRecord {
        let classified = self.classifier.classify(text);
        let lines = &classified.lines;

        let mut record = InvoiceRecord::new();

        for rule in &self.scalars {
            let value = rule.apply(lines, text);
            match rule.field {
                ScalarField::Vendor => record.seller_name = value,
                ScalarField::InvoiceNumber => record.invoice_number = value,
                ScalarField::InvoiceDate => record.invoice_date = value,
                ScalarField::DueDate => record.due_date = value,
                ScalarField::Subtotal => record.subtotal = value,
                ScalarField::Total => record.total = value,
            }
        }

        // Tax depends on the subtotal resolved above
        record.tax = resolve_tax(lines, record.subtotal.as_deref());

        let buyer = classified.party(SectionKind::Buyer);
        record.buyer_name = buyer.name;
        record.buyer_address = buyer.address;

        let ship_to = classified.party(SectionKind::ShipTo);
        record.ship_to_name = ship_to.name;
        record.ship_to_address = ship_to.address;

        record.line_items = self.items.parse_lines(lines);

        debug!(
            "Classified {} lines, {} sections, {} line items",
            lines.len(),
            classified.sections.len(),
            record.line_items.len()
        );

        record
    }
}

impl Default for TextInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for TextInvoiceParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let (prepared, template_override) = self.preprocess(text);
        let record = self.extract_record(&prepared);
        let warnings = record.validate();

        let (filled, total) = record.coverage();
        debug!("Resolved {}/{} fields, {} warnings", filled, total, warnings.len());

        ExtractionResult {
            record,
            text: prepared.into_owned(),
            template_override,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl InvoiceExtractor for TextInvoiceParser {
    fn extract_from_text(&self, text: &str) -> InvoiceRecord {
        self.parse(text).record
    }

    /// Key/value pairs take precedence; fields they leave open are filled
    /// by running the text rules over the graph's LINE blocks.
    fn extract_from_blocks(&self, blocks: &[Block]) -> InvoiceRecord {
        let graph = GraphKeyValueExtractor::new(blocks).extract();
        info!(
            "Graph yielded {} key/value pairs and {} lines",
            graph.key_values.len(),
            graph.lines.len()
        );

        let mut record = record_from_key_values(&graph.key_values);
        let from_lines = self.extract_from_text(&graph.lines.join("\n"));
        record.fill_missing_from(from_lines);
        record
    }
}
