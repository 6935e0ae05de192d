//! Line item detection.
//!
//! OCR flattens table columns, so rows are recognized by shape: at least
//! three tokens, the last two numeric. Address lines are excluded by a
//! keyword denylist.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::models::config::default_address_keywords;
use crate::models::invoice::LineItem;

use super::amounts::normalize_amount;

lazy_static! {
    static ref DEFAULT_DENYLIST: Option<Regex> =
        build_denylist(&default_address_keywords()).unwrap();
}

/// Parser for priced item rows.
#[derive(Debug, Clone)]
pub struct LineItemParser {
    denylist: Option<Regex>,
}

impl LineItemParser {
    /// Create a parser with the default address denylist.
    pub fn new() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.clone(),
        }
    }

    /// Create a parser with a custom address denylist.
    pub fn with_keywords(keywords: &[String]) -> Result<Self> {
        Ok(Self {
            denylist: build_denylist(keywords)?,
        })
    }

    /// Parse every item row, in source order.
    pub fn parse_lines(&self, lines: &[String]) -> Vec<LineItem> {
        lines.iter().filter_map(|l| self.parse_line(l)).collect()
    }

    /// Parse a single row, `None` if it does not look like one.
    pub fn parse_line(&self, line: &str) -> Option<LineItem> {
        if self.is_address(line) {
            return None;
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return None;
        }

        let n = tokens.len();
        if !is_numeric_token(tokens[n - 1]) || !is_numeric_token(tokens[n - 2]) {
            return None;
        }

        // Leading quantity, only when a description token would remain
        let mut quantity = None;
        if tokens.len() >= 4 && is_integer(tokens[0]) {
            quantity = Some(tokens.remove(0));
        }

        let line_total = tokens.pop()?;
        let unit_price = tokens.pop()?;

        // "Brake cables 1 100.00 100.00": quantity column after the description
        if quantity.is_none() && tokens.len() >= 2 && tokens.last().is_some_and(|t| is_integer(t)) {
            quantity = tokens.pop();
        }

        Some(LineItem {
            description: tokens.join(" "),
            quantity: quantity.unwrap_or("1").to_string(),
            unit_price: normalize_amount(unit_price),
            line_total: normalize_amount(line_total),
        })
    }

    fn is_address(&self, line: &str) -> bool {
        self.denylist.as_ref().is_some_and(|re| re.is_match(line))
    }
}

impl Default for LineItemParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Digits, dots and commas only, with at least one digit.
pub fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn build_denylist(keywords: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)(?:^|\W)(?:{})(?:\W|$)", alternatives.join("|"));
    Ok(Some(Regex::new(&pattern)?))
}
