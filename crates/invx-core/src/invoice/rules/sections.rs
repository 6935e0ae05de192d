//! Line splitting and section detection.
//!
//! A section opens at the first line matching its start anchor and runs
//! until a line matching any of its stop anchors, or the end of input.

use regex::Regex;

use super::patterns::{
    BILL_TO_START, BILL_TO_STOP, DUE_DATE_STOP, INVOICE_DATE_STOP, SHIP_TO_START, SHIP_TO_STOP,
    SUBTOTAL_STOP, TAX_STOP, TOTAL_STOP,
};

/// Named address blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// BILL TO block.
    Buyer,
    /// SHIP TO block.
    ShipTo,
}

/// Start anchor plus stop-set for one section.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub kind: SectionKind,
    start: &'static Regex,
    stops: Vec<&'static Regex>,
}

impl SectionRule {
    pub fn new(kind: SectionKind, start: &'static Regex, stops: Vec<&'static Regex>) -> Self {
        Self { kind, start, stops }
    }

    /// BILL TO, closed by SHIP TO or any date/amount anchor.
    pub fn buyer() -> Self {
        Self::new(
            SectionKind::Buyer,
            &*BILL_TO_START,
            vec![
                &*SHIP_TO_STOP,
                &*INVOICE_DATE_STOP,
                &*SUBTOTAL_STOP,
                &*TAX_STOP,
                &*TOTAL_STOP,
                &*DUE_DATE_STOP,
            ],
        )
    }

    /// SHIP TO, closed by BILL TO or any date/amount anchor.
    pub fn ship_to() -> Self {
        Self::new(
            SectionKind::ShipTo,
            &*SHIP_TO_START,
            vec![
                &*BILL_TO_STOP,
                &*INVOICE_DATE_STOP,
                &*SUBTOTAL_STOP,
                &*TAX_STOP,
                &*TOTAL_STOP,
                &*DUE_DATE_STOP,
            ],
        )
    }

    /// Lines belonging to this section, excluding the anchor line itself.
    pub fn locate<'l>(&self, lines: &'l [String]) -> Option<&'l [String]> {
        let start = lines.iter().position(|l| self.start.is_match(l))? + 1;
        let len = lines[start..]
            .iter()
            .position(|l| self.is_stop(l))
            .unwrap_or(lines.len() - start);
        Some(&lines[start..start + len])
    }

    fn is_stop(&self, line: &str) -> bool {
        self.stops.iter().any(|re| re.is_match(line))
    }
}

/// Name and address taken from a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl Party {
    /// First line is the name, the rest joined with ", " is the address.
    pub fn from_lines(lines: &[String]) -> Self {
        match lines.split_first() {
            Some((name, rest)) => Self {
                name: Some(name.clone()),
                address: (!rest.is_empty()).then(|| rest.join(", ")),
            },
            None => Self::default(),
        }
    }
}

/// Output of [`LineClassifier::classify`].
#[derive(Debug, Clone, Default)]
pub struct ClassifiedLines {
    /// Trimmed, non-empty lines in source order.
    pub lines: Vec<String>,
    /// Located sections in rule order.
    pub sections: Vec<(SectionKind, Vec<String>)>,
}

impl ClassifiedLines {
    pub fn section(&self, kind: SectionKind) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, lines)| lines.as_slice())
    }

    pub fn party(&self, kind: SectionKind) -> Party {
        self.section(kind).map(Party::from_lines).unwrap_or_default()
    }
}

/// Splits raw text into lines and locates the address sections.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    rules: Vec<SectionRule>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            rules: vec![SectionRule::buyer(), SectionRule::ship_to()],
        }
    }

    pub fn with_rules(rules: Vec<SectionRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, text: &str) -> ClassifiedLines {
        let lines = split_lines(text);
        let sections = self
            .rules
            .iter()
            .filter_map(|rule| rule.locate(&lines).map(|s| (rule.kind, s.to_vec())))
            .collect();

        ClassifiedLines { lines, sections }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed, non-empty lines of `text`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(
            split_lines("  East Repair Inc.  \n\n\t\nBILL TO\r\n John Smith"),
            lines(&["East Repair Inc.", "BILL TO", "John Smith"])
        );
    }

    #[test]
    fn test_buyer_section() {
        let input = lines(&[
            "BILL TO",
            "John Smith",
            "2 Court Square, New York, NY 12210",
            "SHIP TO",
            "John Smith",
            "3787 Pineview Drive",
            "INVOICE DATE 11/02/2019",
        ]);

        let buyer = Party::from_lines(SectionRule::buyer().locate(&input).unwrap());
        assert_eq!(buyer.name.as_deref(), Some("John Smith"));
        assert_eq!(buyer.address.as_deref(), Some("2 Court Square, New York, NY 12210"));

        let ship = Party::from_lines(SectionRule::ship_to().locate(&input).unwrap());
        assert_eq!(ship.name.as_deref(), Some("John Smith"));
        assert_eq!(ship.address.as_deref(), Some("3787 Pineview Drive"));
    }

    #[test]
    fn test_multi_line_address_is_comma_joined() {
        let input = lines(&["bill to:", "Jane Doe", "2 Court Square", "New York, NY 12210"]);
        let buyer = Party::from_lines(SectionRule::buyer().locate(&input).unwrap());
        assert_eq!(buyer.address.as_deref(), Some("2 Court Square, New York, NY 12210"));
    }

    #[test]
    fn test_empty_section() {
        let input = lines(&["BILL TO", "SHIP TO", "John Smith"]);
        let section = SectionRule::buyer().locate(&input).unwrap();
        assert!(section.is_empty());
        assert_eq!(Party::from_lines(section), Party::default());
    }

    #[test]
    fn test_anchor_must_be_whole_line() {
        let input = lines(&["Please BILL TO the account below", "John Smith"]);
        assert!(SectionRule::buyer().locate(&input).is_none());
    }

    #[test]
    fn test_stop_on_totals() {
        let input = lines(&["SHIP TO", "John Smith", "Subtotal 145.00", "TOTAL $154.06"]);
        let ship = Party::from_lines(SectionRule::ship_to().locate(&input).unwrap());
        assert_eq!(ship.name.as_deref(), Some("John Smith"));
        assert_eq!(ship.address, None);
    }

    #[test]
    fn test_classify() {
        let classified = LineClassifier::new().classify("BILL TO\nJohn Smith\n\nSHIP TO\nAcme Depot\nTOTAL 5.00");
        assert_eq!(classified.lines.len(), 5);
        assert_eq!(classified.party(SectionKind::Buyer).name.as_deref(), Some("John Smith"));
        assert_eq!(classified.party(SectionKind::ShipTo).name.as_deref(), Some("Acme Depot"));
    }

    #[test]
    fn test_missing_sections() {
        let classified = LineClassifier::new().classify("nothing here");
        assert!(classified.section(SectionKind::Buyer).is_none());
        assert_eq!(classified.party(SectionKind::ShipTo), Party::default());
    }
}
