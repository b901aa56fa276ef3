//! Receipt text interpretation
//!
//! Turns raw OCR/PDF text into a best-guess amount, description and category
//! that pre-fill the "add transaction" form. The user reviews the guess before
//! anything is saved, so every rule here is a heuristic:
//!
//! - amount: the largest number in the text (assumed to be the grand total)
//! - description: the first non-blank line (usually the merchant name)
//! - category: first keyword group found in the lower-cased text
//!
//! Numbers that look like dates, quantities or phone numbers are not excluded,
//! so a phone number can win over the real total.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Optional dollar sign, digits, optional single decimal point, optional fraction.
/// ASCII digits only: OCR noise such as fullwidth digits ends the number.
pub(crate) static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?([0-9]+\.?[0-9]*)").expect("valid regex"));

/// Category used when no keyword group matches
pub const FALLBACK_CATEGORY: &str = "Other";

/// Keyword groups in priority order; the first group with any hit wins.
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["restaurant", "food", "cafe"], "Food"),
    (&["gas", "fuel", "uber"], "Transportation"),
    (&["pharmacy", "medical"], "Healthcare"),
    (&["store", "shop"], "Shopping"),
];

/// Fields guessed from a receipt's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReceiptData {
    /// Largest number found, `None` when the text has no digits
    pub amount: Option<f64>,
    /// First non-blank line, trimmed
    pub description: String,
    pub category: String,
}

impl Default for ExtractedReceiptData {
    fn default() -> Self {
        Self {
            amount: None,
            description: String::new(),
            category: FALLBACK_CATEGORY.to_string(),
        }
    }
}

/// Interpret raw receipt text. Never fails; missing signals leave defaults.
pub fn interpret(text: &str) -> ExtractedReceiptData {
    ExtractedReceiptData {
        amount: extract_amount(text),
        description: extract_description(text),
        category: classify_category(text).to_string(),
    }
}

/// Maximum of every amount-looking token in `text`
pub fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .reduce(f64::max)
}

/// Trim whitespace and byte-order marks left behind by OCR/PDF tools
pub(crate) fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// First line that is not blank after trimming
pub fn extract_description(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(trim_line)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Keyword classification over the whole text
pub fn classify_category(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_digits_leaves_amount_unset() {
        let data = interpret("Thank you for visiting\nCome again");
        assert_eq!(data.amount, None);
        assert_eq!(data.category, "Other");
        assert_eq!(data.description, "Thank you for visiting");
    }

    #[test]
    fn test_no_digits_keyword_still_classifies() {
        let data = interpret("Corner Pharmacy");
        assert_eq!(data.amount, None);
        assert_eq!(data.category, "Healthcare");
    }

    #[test]
    fn test_amount_is_largest_number() {
        let data = interpret("Total: $45.67\nTax: $3.21");
        assert_eq!(data.amount, Some(45.67));
    }

    #[test]
    fn test_cafe_receipt() {
        let data = interpret("STARBUCKS CAFE\n$5.25");
        assert_eq!(data.description, "STARBUCKS CAFE");
        assert_eq!(data.category, "Food");
        assert_eq!(data.amount, Some(5.25));
    }

    #[test]
    fn test_gas_station_is_transportation() {
        let data = interpret("Shell Gas Station\nFuel $40.00");
        assert_eq!(data.category, "Transportation");
        assert_eq!(data.amount, Some(40.0));
    }

    #[test]
    fn test_blank_lines_only() {
        let data = interpret("\n   \n\t\n");
        assert_eq!(data.description, "");
        assert_eq!(data.amount, None);
        assert_eq!(data.category, "Other");
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(interpret(""), ExtractedReceiptData::default());
    }

    #[test]
    fn test_priority_food_over_shopping() {
        let data = interpret("Grocery Store\nFresh food aisle\n$12.00");
        assert_eq!(data.category, "Food");
    }

    #[test]
    fn test_priority_transportation_over_healthcare() {
        assert_eq!(classify_category("uber ride to medical center"), "Transportation");
    }

    #[test]
    fn test_keywords_match_inside_words() {
        // "shopping" contains "shop", "Las Vegas" contains "gas"
        assert_eq!(classify_category("SHOPPING MALL"), "Shopping");
        assert_eq!(classify_category("Las Vegas Blvd"), "Transportation");
    }

    #[test]
    fn test_description_skips_leading_blank_lines_and_trims() {
        let data = interpret("\r\n\r\n   Joe's Diner   \r\nTotal 9.99\r\n");
        assert_eq!(data.description, "Joe's Diner");
    }

    #[test]
    fn test_description_with_carriage_return_line_endings() {
        assert_eq!(extract_description("\rACME\rTotal 3"), "ACME");
    }

    #[test]
    fn test_amount_forms() {
        assert_eq!(extract_amount("7"), Some(7.0));
        assert_eq!(extract_amount("$7."), Some(7.0));
        assert_eq!(extract_amount("qty 3 @ $2.50"), Some(3.0));
        assert_eq!(extract_amount("no numbers"), None);
    }

    #[test]
    fn test_date_fragments_compete_with_total() {
        // Known weakness: the year beats the real total.
        let data = interpret("Receipt 03/14/2024\nTOTAL $18.40");
        assert_eq!(data.amount, Some(2024.0));
    }

    #[test]
    fn test_phone_number_beats_total() {
        let data = interpret("Call 5551234\nTotal $20.00");
        assert_eq!(data.amount, Some(5551234.0));
    }

    #[test]
    fn test_interpret_is_idempotent() {
        let text = "Main St Restaurant\nSubtotal 20.00\nTotal $23.10";
        assert_eq!(interpret(text), interpret(text));
    }

    #[test]
    fn test_non_ascii_digit_ends_amount() {
        assert_eq!(interpret("Total $12.50\u{ff15}").amount, Some(12.5));
        assert_eq!(interpret("Total $45.67\u{0663}").amount, Some(45.67));
        assert_eq!(interpret("\u{ff11}\u{ff12}\u{ff13}").amount, None);
    }

    #[test]
    fn test_byte_order_mark_line_is_blank() {
        let data = interpret("\u{feff}\nACME MARKET\n$3.00");
        assert_eq!(data.description, "ACME MARKET");

        let data = interpret("\u{feff}CORNER STORE \r\n$9.99");
        assert_eq!(data.description, "CORNER STORE");
    }

    #[test]
    fn test_serializes_missing_amount_as_null() {
        let json = serde_json::to_value(interpret("hello")).unwrap();
        assert!(json["amount"].is_null());
        assert_eq!(json["description"], "hello");
        assert_eq!(json["category"], "Other");
    }
}
