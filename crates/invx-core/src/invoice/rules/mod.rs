//! Rule-based field extractors for invoice text.

pub mod amounts;
pub mod line_items;
pub mod patterns;
pub mod scalars;
pub mod sections;

pub use amounts::{clean_amount, compute_tax, normalize_amount, parse_amount, repair_ocr_text, AmountExtractor};
pub use line_items::LineItemParser;
pub use scalars::{resolve_tax, ScalarField, ScalarRule, Strategy};
pub use sections::{ClassifiedLines, LineClassifier, Party, SectionKind, SectionRule};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
