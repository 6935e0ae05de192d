//! Single-valued field rules.
//!
//! Each field is an ordered (anchor, strategy) pair evaluated once per
//! document. Line-scoped rules take the first matching line; the total is
//! searched in the whole text and the last hit wins, since footers repeat
//! "TOTAL" under a subtotal before the grand total.

use regex::Regex;
use tracing::trace;

use super::amounts::{clean_amount, compute_tax};
use super::patterns::{
    DUE_DATE, INVOICE_DATE, INVOICE_NUMBER, SALES_TAX_PERCENT, SUBTOTAL_AMOUNT, TAX_AMOUNT,
    TOTAL_AMOUNT, VENDOR_LINE,
};

/// Fields resolved by a single anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Vendor,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    Subtotal,
    Total,
}

/// How matches are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scan lines top to bottom, stop at the first match.
    FirstLine,
    /// Scan the whole text, keep the last match.
    LastInText,
}

/// One anchor rule.
#[derive(Debug, Clone)]
pub struct ScalarRule {
    pub field: ScalarField,
    pattern: &'static Regex,
    strategy: Strategy,
    amount: bool,
}

impl ScalarRule {
    pub fn new(field: ScalarField, pattern: &'static Regex, strategy: Strategy) -> Self {
        Self {
            field,
            pattern,
            strategy,
            amount: false,
        }
    }

    /// Mark the captured value as an amount to be normalized.
    pub fn amount(mut self) -> Self {
        self.amount = true;
        self
    }

    /// Default rule table, in evaluation order.
    pub fn defaults() -> Vec<ScalarRule> {
        vec![
            ScalarRule::new(ScalarField::Vendor, &*VENDOR_LINE, Strategy::FirstLine),
            ScalarRule::new(ScalarField::InvoiceNumber, &*INVOICE_NUMBER, Strategy::FirstLine),
            ScalarRule::new(ScalarField::InvoiceDate, &*INVOICE_DATE, Strategy::FirstLine),
            ScalarRule::new(ScalarField::DueDate, &*DUE_DATE, Strategy::FirstLine),
            ScalarRule::new(ScalarField::Subtotal, &*SUBTOTAL_AMOUNT, Strategy::FirstLine).amount(),
            ScalarRule::new(ScalarField::Total, &*TOTAL_AMOUNT, Strategy::LastInText).amount(),
        ]
    }

    /// Evaluate the rule against a document.
    pub fn apply(&self, lines: &[String], text: &str) -> Option<String> {
        let captured = match self.strategy {
            Strategy::FirstLine => lines.iter().find_map(|line| self.capture(line)),
            Strategy::LastInText => self
                .pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .last(),
        }?;

        trace!("{:?} matched {:?}", self.field, captured);

        if self.amount {
            clean_amount(&captured)
        } else {
            Some(captured.trim().to_string())
        }
    }

    fn capture(&self, line: &str) -> Option<String> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Resolve the tax amount.
///
/// A `SALES TAX <pct>%` line combined with a known subtotal wins over any
/// literal amount on that line; otherwise the first `TAX <amount>` or
/// `SALES TAX <amount>` line is used.
pub fn resolve_tax(lines: &[String], subtotal: Option<&str>) -> Option<String> {
    if let Some(subtotal) = subtotal {
        let computed = lines.iter().find_map(|line| {
            let caps = SALES_TAX_PERCENT.captures(line)?;
            compute_tax(subtotal, &caps[1])
        });
        if computed.is_some() {
            return computed;
        }
    }

    lines
        .iter()
        .find_map(|line| TAX_AMOUNT.captures(line))
        .and_then(|caps| clean_amount(&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn rule(field: ScalarField) -> ScalarRule {
        ScalarRule::defaults()
            .into_iter()
            .find(|r| r.field == field)
            .unwrap()
    }

    #[test]
    fn test_vendor_tolerates_trailing_punctuation() {
        let vendor = rule(ScalarField::Vendor);
        for name in ["East Repair Inc.", "East Repair Inc", "Acme, LLC", "Globex Corp,"] {
            let input = lines(&["INVOICE", name, "BILL TO"]);
            assert_eq!(vendor.apply(&input, ""), Some(name.to_string()));
        }
        assert_eq!(vendor.apply(&lines(&["Incoming goods"]), ""), None);
    }

    #[test]
    fn test_vendor_first_match_wins() {
        let input = lines(&["East Repair Inc.", "BILL TO", "Acme Corp"]);
        assert_eq!(rule(ScalarField::Vendor).apply(&input, ""), Some("East Repair Inc.".to_string()));
    }

    #[test]
    fn test_invoice_date_requires_date_token() {
        let date = rule(ScalarField::InvoiceDate);
        assert_eq!(
            date.apply(&lines(&["INVOICE DATE 11/02/2019"]), ""),
            Some("11/02/2019".to_string())
        );
        assert_eq!(
            date.apply(&lines(&["Invoice Date: 1/2/2019 (est.)"]), ""),
            Some("1/2/2019".to_string())
        );
        assert_eq!(date.apply(&lines(&["INVOICE DATE", "11/02/2019"]), ""), None);
        assert_eq!(date.apply(&lines(&["INVOICE DATE 11-02-2019"]), ""), None);
    }

    #[test]
    fn test_due_date_and_number() {
        let input = lines(&["INVOICE # US-001", "P.O.# 2312/2019", "DUE DATE 26/02/2019"]);
        assert_eq!(rule(ScalarField::DueDate).apply(&input, ""), Some("26/02/2019".to_string()));
        assert_eq!(rule(ScalarField::InvoiceNumber).apply(&input, ""), Some("US-001".to_string()));
        assert_eq!(rule(ScalarField::InvoiceNumber).apply(&lines(&["INVOICE DATE 1/1/2020"]), ""), None);
    }

    #[test]
    fn test_total_takes_last_match() {
        let text = "TOTAL 145.00\nthanks\nTOTAL $154.06\n";
        assert_eq!(
            rule(ScalarField::Total).apply(&[], text),
            Some("154.06".to_string())
        );
    }

    #[test]
    fn test_total_counts_subtotal_occurrence() {
        let text = "Subtotal 145.00\nTOTAL";
        assert_eq!(rule(ScalarField::Total).apply(&[], text), Some("145.00".to_string()));
    }

    #[test]
    fn test_subtotal_is_line_anchored() {
        let subtotal = rule(ScalarField::Subtotal);
        assert_eq!(subtotal.apply(&lines(&["Subtotal 14500"]), ""), Some("145.00".to_string()));
        assert_eq!(subtotal.apply(&lines(&["before Subtotal 145.00"]), ""), None);
        assert_eq!(subtotal.apply(&lines(&["Subtotal"]), ""), None);
    }

    #[test]
    fn test_tax_from_percentage() {
        let input = lines(&["Subtotal 145.00", "Sales Tax 6.25%"]);
        assert_eq!(resolve_tax(&input, Some("145.00")), Some("9.06".to_string()));
    }

    #[test]
    fn test_tax_percentage_overrides_literal() {
        let input = lines(&["Sales Tax 6.25% 9.99"]);
        assert_eq!(resolve_tax(&input, Some("145.00")), Some("9.06".to_string()));
    }

    #[test]
    fn test_tax_literal_fallback() {
        assert_eq!(resolve_tax(&lines(&["TAX 9.06"]), None), Some("9.06".to_string()));
        assert_eq!(resolve_tax(&lines(&["Sales Tax $906"]), None), Some("9.06".to_string()));
        assert_eq!(resolve_tax(&lines(&["Sales Tax 6.25%"]), None), None);
        assert_eq!(resolve_tax(&lines(&["Tax exempt"]), None), None);
    }
}
