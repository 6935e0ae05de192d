//! Amount normalization and OCR repairs for invoice figures.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::patterns::{NUMERIC_TOKEN, STRAY_TAX_DIGITS, TAX_DIGIT_MERGE};
use super::FieldExtractor;

/// Numeric token extractor, yielding canonical decimal strings.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        NUMERIC_TOKEN
            .find_iter(text)
            .map(|m| normalize_amount(m.as_str().trim_end_matches(['.', ','])))
            .collect()
    }
}

/// Restore a decimal point OCR dropped from a currency amount.
///
/// Tokens that already carry a separator are returned unchanged; bare
/// 3- or 4-digit integers get a point two digits from the end
/// (`"1500"` → `"15.00"`); anything else is returned as is.
pub fn normalize_amount(token: &str) -> String {
    if token.contains(['.', ',']) {
        return token.to_string();
    }

    if (3..=4).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit()) {
        let (whole, cents) = token.split_at(token.len() - 2);
        return format!("{}.{}", whole, cents);
    }

    token.to_string()
}

/// Pull the first numeric token out of a raw value such as `"$154.06"` and normalize it.
pub fn clean_amount(raw: &str) -> Option<String> {
    AmountExtractor::new().extract(raw)
}

/// Parse an amount string into a decimal (`"1,234.56"`, `"154,06"`, `"$9.06"`).
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // "1,234.56": commas group thousands
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // "154,06": comma is the decimal separator
        (Some(c), None) if cleaned.len() - c == 3 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Tax from a subtotal and a percentage, rounded half away from zero to cents.
///
/// Returns `None` when either input does not parse or the product
/// overflows `Decimal`.
pub fn compute_tax(subtotal: &str, percent: &str) -> Option<String> {
    let subtotal = parse_amount(subtotal)?;
    let percent = parse_amount(percent)?;

    let mut tax = subtotal
        .checked_mul(percent)?
        .checked_div(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    tax.rescale(2);

    Some(tax.to_string())
}

/// Undo OCR token merges around tax lines.
///
/// `"Tax9.06"` becomes `"Tax 9.06"`, then a stray integer trailing a
/// percentage (`"Sales Tax 6.25% 906"`) is dropped so the rate parses cleanly.
pub fn repair_ocr_text(text: &str) -> Cow<'_, str> {
    let spaced = TAX_DIGIT_MERGE.replace_all(text, "$1 $2");
    if !STRAY_TAX_DIGITS.is_match(&spaced) {
        return spaced;
    }
    Cow::Owned(STRAY_TAX_DIGITS.replace_all(&spaced, "$1").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1500"), "15.00");
        assert_eq!(normalize_amount("206"), "2.06");
        assert_eq!(normalize_amount("9.06"), "9.06");
        assert_eq!(normalize_amount("1,500"), "1,500");
        assert_eq!(normalize_amount("7"), "7");
        assert_eq!(normalize_amount("12345"), "12345");
        assert_eq!(normalize_amount("12a4"), "12a4");
        assert_eq!(normalize_amount(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for token in ["1500", "206", "7", "12345", "100.00"] {
            let once = normalize_amount(token);
            assert_eq!(normalize_amount(&once), once);
        }
    }

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("$154.06"), Some("154.06".to_string()));
        assert_eq!(clean_amount("USD 1500"), Some("15.00".to_string()));
        assert_eq!(clean_amount("154.06."), Some("154.06".to_string()));
        assert_eq!(clean_amount("n/a"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("145.00"), Some(Decimal::new(14500, 2)));
        assert_eq!(parse_amount("$1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("154,06"), Some(Decimal::new(15406, 2)));
        assert_eq!(parse_amount("1,500"), Some(Decimal::new(1500, 0)));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_compute_tax() {
        assert_eq!(compute_tax("145.00", "6.25"), Some("9.06".to_string()));
        assert_eq!(compute_tax("100", "8"), Some("8.00".to_string()));
        // 0.125 rounds away from zero
        assert_eq!(compute_tax("2.50", "5"), Some("0.13".to_string()));
        assert_eq!(compute_tax("n/a", "5"), None);
    }

    #[test]
    fn test_compute_tax_overflow_yields_none() {
        assert_eq!(compute_tax("79228162514264337593543950335", "500"), None);
    }

    #[test]
    fn test_repair_ocr_text() {
        assert_eq!(repair_ocr_text("Tax9.06"), "Tax 9.06");
        assert_eq!(repair_ocr_text("Sales Tax 6.25% 906"), "Sales Tax 6.25%");
        assert_eq!(repair_ocr_text("Sales Tax6.25% 906\nTOTAL $154.06"), "Sales Tax 6.25%\nTOTAL $154.06");
        assert_eq!(repair_ocr_text("Sales Tax 6.25% 9.06"), "Sales Tax 6.25% 9.06");
        assert!(matches!(repair_ocr_text("TOTAL 10.00"), Cow::Borrowed(_)));
    }
}
