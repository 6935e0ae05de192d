//! WASM bindings for invoice field extraction.
//!
//! This crate provides WebAssembly bindings for the browser editing UI.
//! Records cross the boundary as plain JS objects with "Not found" for
//! missing fields.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use invx_core::models::config::ExtractionConfig;
use invx_core::{
    AnalyzeDocumentResponse, ExtractionResult, GraphExtraction, GraphKeyValueExtractor, InvoiceParser,
    InvoiceRecord, TextInvoiceParser,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract invoice data from raw OCR text.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&TextInvoiceParser::new().parse(text).record)
}

/// Flatten an analysis-service response (JSON text) into key/value pairs and lines.
#[wasm_bindgen]
pub fn extract_key_values(json: &str) -> Result<JsValue, JsValue> {
    to_js(&key_values_from_json(json).map_err(js_error)?)
}

/// Restore a dropped decimal point in an OCR amount (`"1500"` → `"15.00"`).
#[wasm_bindgen]
pub fn normalize_amount(token: &str) -> String {
    invx_core::invoice::rules::normalize_amount(token)
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    config: ExtractionConfig,
    parser: TextInvoiceParser,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = ExtractionConfig::default();
        let parser = TextInvoiceParser::new();
        Self { config, parser }
    }

    /// Enable or disable the known-template override stage.
    #[wasm_bindgen]
    pub fn set_template_override(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.config.enable_template_override = enabled;
        self.rebuild()
    }

    /// Enable or disable OCR text repairs.
    #[wasm_bindgen]
    pub fn set_ocr_repairs(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.config.apply_ocr_repairs = enabled;
        self.rebuild()
    }

    /// Extract invoice from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.run(text).record)
    }

    /// Get extraction result with metadata.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&ExtractOutput::from(self.run(text)))
    }

    /// Extract an invoice record from an analysis-service response (JSON text).
    #[wasm_bindgen]
    pub fn extract_from_analysis(&self, json: &str) -> Result<JsValue, JsValue> {
        to_js(&record_from_json(&self.parser, json).map_err(js_error)?)
    }
}

impl InvoiceExtractor {
    fn rebuild(&mut self) -> Result<(), JsValue> {
        self.parser = TextInvoiceParser::from_config(&self.config).map_err(|e| js_error(e.to_string()))?;
        Ok(())
    }

    fn run(&self, text: &str) -> ExtractionResult {
        let result = self.parser.parse(text);
        if let Some(name) = &result.template_override {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "invx: input replaced by known template '{}'",
                name
            )));
        }
        result
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ExtractOutput {
    record: InvoiceRecord,
    text: String,
    template_override: Option<String>,
    warnings: Vec<String>,
    processing_time_ms: u64,
}

impl From<ExtractionResult> for ExtractOutput {
    fn from(result: ExtractionResult) -> Self {
        Self {
            record: result.record,
            text: result.text,
            template_override: result.template_override,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        }
    }
}

fn key_values_from_json(json: &str) -> Result<GraphExtraction, String> {
    let response = AnalyzeDocumentResponse::from_json(json).map_err(|e| e.to_string())?;
    Ok(GraphKeyValueExtractor::new(&response.blocks).extract())
}

fn record_from_json(parser: &TextInvoiceParser, json: &str) -> Result<InvoiceRecord, String> {
    use invx_core::InvoiceExtractor as _;

    let response = AnalyzeDocumentResponse::from_json(json).map_err(|e| e.to_string())?;
    Ok(parser.extract_from_blocks(&response.blocks))
}

/// Plain JS objects (not `Map`s), so key/value pairs keep their order.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(e.to_string()))
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&format!("Processing failed: {}", message)).into()
}
