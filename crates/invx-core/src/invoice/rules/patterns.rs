//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Section start anchors (whole line)
    pub static ref BILL_TO_START: Regex = Regex::new(r"(?i)^bill\s+to\s*:?$").unwrap();

    pub static ref SHIP_TO_START: Regex = Regex::new(r"(?i)^ship\s+to\s*:?$").unwrap();

    // Section stop anchors (line prefix)
    pub static ref BILL_TO_STOP: Regex = Regex::new(r"(?i)^bill\s+to\b").unwrap();

    pub static ref SHIP_TO_STOP: Regex = Regex::new(r"(?i)^ship\s+to\b").unwrap();

    pub static ref INVOICE_DATE_STOP: Regex = Regex::new(r"(?i)^invoice\s+date\b").unwrap();

    pub static ref DUE_DATE_STOP: Regex = Regex::new(r"(?i)^due\s+date\b").unwrap();

    pub static ref SUBTOTAL_STOP: Regex = Regex::new(r"(?i)^sub\s*total\b").unwrap();

    pub static ref TAX_STOP: Regex = Regex::new(r"(?i)^(?:sales\s+)?tax\b").unwrap();

    pub static ref TOTAL_STOP: Regex = Regex::new(r"(?i)^total\b").unwrap();

    // Seller: a company name ending in a corporate suffix, optional trailing punctuation
    pub static ref VENDOR_LINE: Regex = Regex::new(
        r"(?i)^((?:[\w&'\-]+[ ,]+)+(?:inc|llc|ltd|corp|corporation|co|gmbh|plc)[.,]?)$"
    ).unwrap();

    // Labeled scalars
    pub static ref INVOICE_DATE: Regex = Regex::new(
        r"(?i)invoice\s+date\s*:?\s*(\d{1,2}/\d{1,2}/\d{4})\b"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)due\s+date\s*:?\s*(\d{1,2}/\d{1,2}/\d{4})\b"
    ).unwrap();

    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)^invoice\s*(?:#|no\b\.?|number\b)\s*:?\s*([A-Za-z0-9][A-Za-z0-9/\-_.]*)"
    ).unwrap();

    // Amounts
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)total[ \t]*:?[ \t]*[$€£]?[ \t]*(\d[\d.,]*)"
    ).unwrap();

    pub static ref SUBTOTAL_AMOUNT: Regex = Regex::new(
        r"(?i)^sub\s*total\s*:?\s*[$€£]?\s*(\d[\d.,]*)(?:\s|$)"
    ).unwrap();

    pub static ref SALES_TAX_PERCENT: Regex = Regex::new(
        r"(?i)\bsales\s+tax\s+(\d+(?:\.\d+)?)\s*%"
    ).unwrap();

    pub static ref TAX_AMOUNT: Regex = Regex::new(
        r"(?i)^(?:sales\s+)?tax\s*:?\s*[$€£]?\s*(\d[\d.,]*)(?:\s|$)"
    ).unwrap();

    pub static ref NUMERIC_TOKEN: Regex = Regex::new(r"\d[\d.,]*").unwrap();

    pub static ref PERCENT_LABEL: Regex = Regex::new(r"^\d+(?:[.,]\d+)?\s*%$").unwrap();

    // OCR repairs
    pub static ref TAX_DIGIT_MERGE: Regex = Regex::new(r"(?i)(tax)(\d)").unwrap();

    pub static ref STRAY_TAX_DIGITS: Regex = Regex::new(
        r"(?im)^([ \t]*sales\s+tax\s+\d+(?:\.\d+)?\s*%)[ \t]+\d+[ \t\r]*$"
    ).unwrap();
}
