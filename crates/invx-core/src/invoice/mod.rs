//! Invoice field extraction module.

mod parser;
pub mod rules;
pub mod template;

pub use parser::{ExtractionResult, InvoiceParser, TextInvoiceParser};
pub use template::{KnownTemplate, TemplateOverride};

use crate::models::block::Block;
use crate::models::invoice::InvoiceRecord;

/// One interface over both input shapes.
///
/// Extraction never fails: anything that cannot be resolved is left absent.
pub trait InvoiceExtractor {
    /// Extract an invoice record from raw recognized text.
    fn extract_from_text(&self, text: &str) -> InvoiceRecord;

    /// Extract an invoice record from a document-analysis block graph.
    fn extract_from_blocks(&self, blocks: &[Block]) -> InvoiceRecord;
}
