//! Mapping of flattened form labels onto [`InvoiceRecord`] fields.

use tracing::trace;

use crate::invoice::rules::amounts::clean_amount;
use crate::invoice::rules::patterns::{PERCENT_LABEL, VENDOR_LINE};
use crate::models::invoice::InvoiceRecord;

use super::KeyValueMap;

/// Map well-known form labels onto an invoice record.
///
/// Labels compare case-insensitively with a trailing colon ignored. When
/// several keys map to the same field the first one in the map wins.
pub fn record_from_key_values(pairs: &KeyValueMap) -> InvoiceRecord {
    let mut record = InvoiceRecord::new();

    for (key, value) in pairs.iter() {
        let label = key.trim().trim_end_matches(':').trim_end().to_uppercase();
        let value = value.trim();

        let (slot, parsed) = match label.as_str() {
            "BILL TO" => (&mut record.buyer_name, text(value)),
            "SHIP TO" => (&mut record.ship_to_name, text(value)),
            "INVOICE #" | "INVOICE NO" | "INVOICE NO." | "INVOICE NUMBER" => {
                (&mut record.invoice_number, text(value))
            }
            "INVOICE DATE" => (&mut record.invoice_date, text(value)),
            "DUE DATE" => (&mut record.due_date, text(value)),
            "SUBTOTAL" | "SUB TOTAL" => (&mut record.subtotal, clean_amount(value)),
            "TOTAL" => (&mut record.total, clean_amount(value)),
            l if l.starts_with("TAX") || l.starts_with("SALES TAX") || PERCENT_LABEL.is_match(l) => {
                (&mut record.tax, clean_amount(value))
            }
            _ if VENDOR_LINE.is_match(key.trim()) => (&mut record.seller_name, text(key.trim())),
            _ => continue,
        };

        if slot.is_none() && parsed.is_some() {
            trace!("Key {:?} mapped to {:?}", key, parsed);
            *slot = parsed;
        }
    }

    record
}

fn text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maps_known_labels() {
        let pairs: KeyValueMap = [
            ("East Repair Inc.", ""),
            ("BILL TO", "John Smith"),
            ("Ship To:", "John Smith"),
            ("INVOICE #", "US-001"),
            ("INVOICE DATE", "11/02/2019"),
            ("DUE DATE", "26/02/2019"),
            ("Subtotal", "145.00"),
            ("6.25%", "906"),
            ("TOTAL", "$154.06"),
            ("P.O.#", "2312/2019"),
        ]
        .into_iter()
        .collect();

        let record = record_from_key_values(&pairs);
        assert_eq!(record.seller_name.as_deref(), Some("East Repair Inc."));
        assert_eq!(record.buyer_name.as_deref(), Some("John Smith"));
        assert_eq!(record.ship_to_name.as_deref(), Some("John Smith"));
        assert_eq!(record.invoice_number.as_deref(), Some("US-001"));
        assert_eq!(record.invoice_date.as_deref(), Some("11/02/2019"));
        assert_eq!(record.due_date.as_deref(), Some("26/02/2019"));
        assert_eq!(record.subtotal.as_deref(), Some("145.00"));
        assert_eq!(record.tax.as_deref(), Some("9.06"));
        assert_eq!(record.total.as_deref(), Some("154.06"));
        assert!(record.line_items.is_empty());
    }

    #[test]
    fn test_first_key_wins_and_empty_values_skip() {
        let pairs: KeyValueMap = [
            ("TOTAL:", ""),
            ("total", "10.00"),
            ("Sales Tax", "1.00"),
            ("TAX", "2.00"),
        ]
        .into_iter()
        .collect();

        let record = record_from_key_values(&pairs);
        assert_eq!(record.total.as_deref(), Some("10.00"));
        assert_eq!(record.tax.as_deref(), Some("1.00"));
    }

    #[test]
    fn test_unknown_labels_leave_record_empty() {
        let pairs: KeyValueMap = [("Terms", "Net 30"), ("P.O.#", "2312/2019")].into_iter().collect();
        assert_eq!(record_from_key_values(&pairs), InvoiceRecord::new());
    }
}
