//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - Key/value flattening of document-analysis block graphs
//! - Line classification and section detection for raw OCR text
//! - Line item detection and OCR amount repair
//! - A normalized invoice record shared by both input paths

pub mod error;
pub mod graph;
pub mod invoice;
pub mod models;

pub use error::{InvxError, Result};
pub use graph::{GraphExtraction, GraphKeyValueExtractor, KeyValueMap};
pub use invoice::{ExtractionResult, InvoiceExtractor, InvoiceParser, TextInvoiceParser};
pub use models::block::{AnalyzeDocumentResponse, Block, BlockType, Relationship, RelationshipType};
pub use models::config::InvxConfig;
pub use models::invoice::{InvoiceRecord, LineItem, NOT_FOUND};
