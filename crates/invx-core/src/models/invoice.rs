//! Normalized invoice record shared by the text and graph extraction paths.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::amounts::parse_amount;

/// Placeholder written for any field the engine could not resolve.
pub const NOT_FOUND: &str = "Not found";

/// The structured result of one extraction call.
///
/// Missing scalar fields are `None` in memory and serialize as
/// [`NOT_FOUND`]; deserializing [`NOT_FOUND`] (or an empty string) yields
/// `None` again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Seller / vendor company name.
    #[serde(with = "not_found")]
    pub seller_name: Option<String>,

    /// Buyer name (first line of the BILL TO block).
    #[serde(with = "not_found")]
    pub buyer_name: Option<String>,

    /// Buyer address (remaining BILL TO lines, comma-joined).
    #[serde(with = "not_found")]
    pub buyer_address: Option<String>,

    /// Ship-to name.
    #[serde(with = "not_found")]
    pub ship_to_name: Option<String>,

    /// Ship-to address.
    #[serde(with = "not_found")]
    pub ship_to_address: Option<String>,

    /// Invoice / transaction number.
    #[serde(with = "not_found")]
    pub invoice_number: Option<String>,

    /// Invoice date as printed (D/M/YYYY or M/D/YYYY).
    #[serde(with = "not_found")]
    pub invoice_date: Option<String>,

    /// Payment due date as printed.
    #[serde(with = "not_found")]
    pub due_date: Option<String>,

    /// Line items in source order.
    pub line_items: Vec<LineItem>,

    /// Subtotal before tax.
    #[serde(with = "not_found")]
    pub subtotal: Option<String>,

    /// Tax amount.
    #[serde(with = "not_found")]
    pub tax: Option<String>,

    /// Grand total.
    #[serde(with = "not_found")]
    pub total: Option<String>,
}

/// A single priced row of the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description.
    pub description: String,

    /// Integer quantity literal, "1" when the row has none.
    pub quantity: String,

    /// Unit price as a decimal string.
    pub unit_price: String,

    /// Line total as a decimal string.
    pub line_total: String,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
        line_total: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            line_total: line_total.into(),
        }
    }
}

impl InvoiceRecord {
    /// Create an empty record (every field absent).
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field as it appears at the external boundary.
    pub fn display_field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or(NOT_FOUND)
    }

    /// Number of scalar fields that were resolved, out of the total.
    pub fn coverage(&self) -> (usize, usize) {
        let fields = [
            &self.seller_name,
            &self.buyer_name,
            &self.buyer_address,
            &self.ship_to_name,
            &self.ship_to_address,
            &self.invoice_number,
            &self.invoice_date,
            &self.due_date,
            &self.subtotal,
            &self.tax,
            &self.total,
        ];
        let filled = fields.iter().filter(|f| f.is_some()).count();
        (filled, fields.len())
    }

    /// Fill every absent field from `other`, keeping values already present.
    pub fn fill_missing_from(&mut self, other: InvoiceRecord) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.seller_name, other.seller_name);
        fill(&mut self.buyer_name, other.buyer_name);
        fill(&mut self.buyer_address, other.buyer_address);
        fill(&mut self.ship_to_name, other.ship_to_name);
        fill(&mut self.ship_to_address, other.ship_to_address);
        fill(&mut self.invoice_number, other.invoice_number);
        fill(&mut self.invoice_date, other.invoice_date);
        fill(&mut self.due_date, other.due_date);
        fill(&mut self.subtotal, other.subtotal);
        fill(&mut self.tax, other.tax);
        fill(&mut self.total, other.total);

        if self.line_items.is_empty() {
            self.line_items = other.line_items;
        }
    }

    /// Render the record back into plain invoice text.
    ///
    /// Parsing the rendered text with the default text parser yields an
    /// equal record. Address blocks go last: a section only ends at one of
    /// its stop anchors or at the end of the input.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(seller) = &self.seller_name {
            lines.push(seller.clone());
        }
        if let Some(number) = &self.invoice_number {
            lines.push(format!("INVOICE # {}", number));
        }
        if let Some(date) = &self.invoice_date {
            lines.push(format!("INVOICE DATE {}", date));
        }
        if let Some(date) = &self.due_date {
            lines.push(format!("DUE DATE {}", date));
        }

        for item in &self.line_items {
            lines.push(format!(
                "{} {} {} {}",
                item.quantity, item.description, item.unit_price, item.line_total
            ));
        }

        if let Some(subtotal) = &self.subtotal {
            lines.push(format!("SUBTOTAL {}", subtotal));
        }
        if let Some(tax) = &self.tax {
            lines.push(format!("TAX {}", tax));
        }
        if let Some(total) = &self.total {
            lines.push(format!("TOTAL {}", total));
        }

        push_block(&mut lines, "BILL TO", &self.buyer_name, &self.buyer_address);
        push_block(&mut lines, "SHIP TO", &self.ship_to_name, &self.ship_to_address);

        lines.join("\n")
    }

    /// Check the record for internal inconsistencies.
    ///
    /// Issues are advisory; a record with warnings is still returned to the caller.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.seller_name.is_none() {
            issues.push("Missing seller name".to_string());
        }
        if self.buyer_name.is_none() {
            issues.push("Missing buyer information".to_string());
        }
        if self.total.is_none() {
            issues.push("Missing total".to_string());
        }

        for (label, date) in [("invoice date", &self.invoice_date), ("due date", &self.due_date)] {
            if let Some(date) = date {
                if parse_printed_date(date).is_none() {
                    issues.push(format!("Unparseable {}: {}", label, date));
                }
            }
        }

        let tolerance = Decimal::new(1, 2);
        let subtotal = self.subtotal.as_deref().and_then(parse_amount);

        if let Some(subtotal) = subtotal.filter(|_| !self.line_items.is_empty()) {
            let item_totals = self
                .line_items
                .iter()
                .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(parse_amount(&i.line_total)?));
            match item_totals.and_then(|sum| Some((sum, sum.checked_sub(subtotal)?))) {
                Some((sum, diff)) if diff.abs() > tolerance => issues.push(format!(
                    "Line item total ({}) differs from subtotal ({})",
                    sum, subtotal
                )),
                Some(_) => {}
                None => issues.push("Line item totals could not be checked against subtotal".to_string()),
            }
        }

        let tax = self.tax.as_deref().and_then(parse_amount);
        let total = self.total.as_deref().and_then(parse_amount);
        if let (Some(subtotal), Some(tax), Some(total)) = (subtotal, tax, total) {
            match subtotal.checked_add(tax).and_then(|sum| sum.checked_sub(total)) {
                Some(diff) if diff.abs() > tolerance => issues.push(format!(
                    "Subtotal ({}) plus tax ({}) differs from total ({})",
                    subtotal, tax, total
                )),
                Some(_) => {}
                None => issues.push("Subtotal plus tax could not be checked against total".to_string()),
            }
        }

        issues
    }
}

fn push_block(lines: &mut Vec<String>, anchor: &str, name: &Option<String>, address: &Option<String>) {
    if let Some(name) = name {
        lines.push(anchor.to_string());
        lines.push(name.clone());
        if let Some(address) = address {
            lines.push(address.clone());
        }
    }
}

/// Parse a printed date, trying month-first then day-first.
pub fn parse_printed_date(s: &str) -> Option<NaiveDate> {
    ["%m/%d/%Y", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// Serde adapter mapping `None` to the "Not found" placeholder.
mod not_found {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NOT_FOUND;

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(NOT_FOUND))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|v| !v.is_empty() && v != NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> InvoiceRecord {
        InvoiceRecord {
            seller_name: Some("East Repair Inc.".to_string()),
            buyer_name: Some("John Smith".to_string()),
            buyer_address: Some("2 Court Square, New York, NY 12210".to_string()),
            invoice_date: Some("11/02/2019".to_string()),
            line_items: vec![
                LineItem::new("Front and rear brake cables", "1", "100.00", "100.00"),
                LineItem::new("New set of pedal arms", "2", "15.00", "30.00"),
                LineItem::new("Labor 3hrs", "3", "5.00", "15.00"),
            ],
            subtotal: Some("145.00".to_string()),
            tax: Some("9.06".to_string()),
            total: Some("154.06".to_string()),
            ..InvoiceRecord::default()
        }
    }

    #[test]
    fn test_missing_fields_serialize_as_not_found() {
        let json = serde_json::to_value(InvoiceRecord::new()).unwrap();
        assert_eq!(json["seller_name"], "Not found");
        assert_eq!(json["total"], "Not found");
        assert_eq!(json["line_items"], serde_json::json!([]));
    }

    #[test]
    fn test_not_found_deserializes_to_none() {
        let record: InvoiceRecord =
            serde_json::from_str(r#"{"seller_name": "Not found", "total": "154.06"}"#).unwrap();
        assert_eq!(record.seller_name, None);
        assert_eq!(record.total.as_deref(), Some("154.06"));
        assert_eq!(record.buyer_name, None);
    }

    #[test]
    fn test_json_round_trip() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: InvoiceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_to_text_layout() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "East Repair Inc.");
        assert!(lines.contains(&"1 Front and rear brake cables 100.00 100.00"));
        assert!(lines.contains(&"TOTAL 154.06"));
        assert_eq!(lines[lines.len() - 3], "BILL TO");
    }

    #[test]
    fn test_validate_consistent_record() {
        assert!(sample().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_mismatches() {
        let mut record = sample();
        record.total = Some("200.00".to_string());
        record.due_date = Some("31/31/2019".to_string());
        record.line_items.pop();

        let issues = record.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.contains("due date")));
        assert!(issues.iter().any(|i| i.contains("Line item total")));
        assert!(issues.iter().any(|i| i.contains("differs from total")));
    }

    #[test]
    fn test_validate_survives_decimal_overflow() {
        let huge = "50000000000000000000000000000";
        let record = InvoiceRecord {
            seller_name: Some("Acme".to_string()),
            buyer_name: Some("Bob".to_string()),
            line_items: vec![
                LineItem::new("Widget", "1", huge, huge),
                LineItem::new("Gadget", "1", huge, huge),
            ],
            subtotal: Some("79228162514264337593543950335".to_string()),
            tax: Some("79228162514264337593543950335".to_string()),
            total: Some("1.00".to_string()),
            ..InvoiceRecord::default()
        };

        let issues = record.validate();
        assert_eq!(issues.len(), 2, "{:?}", issues);
        assert!(issues.iter().any(|i| i.contains("Line item totals could not be checked")));
        assert!(issues.iter().any(|i| i.contains("plus tax could not be checked")));
    }

    #[test]
    fn test_fill_missing_keeps_present_values() {
        let mut record = InvoiceRecord {
            total: Some("1.00".to_string()),
            ..InvoiceRecord::default()
        };
        record.fill_missing_from(sample());

        assert_eq!(record.total.as_deref(), Some("1.00"));
        assert_eq!(record.seller_name.as_deref(), Some("East Repair Inc."));
        assert_eq!(record.line_items.len(), 3);
        assert_eq!(record.ship_to_name, None);
    }

    #[test]
    fn test_coverage() {
        assert_eq!(InvoiceRecord::new().coverage(), (0, 11));
        assert_eq!(sample().coverage(), (7, 11));
    }

    #[test]
    fn test_parse_printed_date() {
        assert_eq!(parse_printed_date("11/02/2019"), NaiveDate::from_ymd_opt(2019, 11, 2));
        assert_eq!(parse_printed_date("26/02/2019"), NaiveDate::from_ymd_opt(2019, 2, 26));
        assert_eq!(parse_printed_date("2019-02-26"), None);
    }
}
