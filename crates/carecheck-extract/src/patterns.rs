//! Field patterns for checklist text
//!
//! Each field has an ordered list of rules. The first rule whose pattern matches
//! decides the field; later rules are not consulted even if the captured value
//! turns out to be unusable.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which pattern set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Text layer: reliable line breaks
    Text,
    /// OCR output: fragments joined with spaces, line breaks lost
    Ocr,
}

/// The three values pulled from a checklist. Each one is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    pub census: Option<u64>,
    pub contact_person: Option<String>,
    pub licensor: Option<String>,
}

impl Fields {
    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.census.is_none() && self.contact_person.is_none() && self.licensor.is_none()
    }
}

/// A pattern paired with the rule for reading its value.
#[derive(Debug)]
pub enum Rule {
    /// Value is the last participating capture group, read as an integer
    LastInteger(Regex),
    /// Value is capture group 1, whitespace runs collapsed
    Phrase(Regex),
}

impl Rule {
    fn last_integer(pattern: &str) -> Self {
        Self::LastInteger(Regex::new(pattern).expect("invalid census pattern"))
    }

    fn phrase(pattern: &str) -> Self {
        Self::Phrase(Regex::new(pattern).expect("invalid phrase pattern"))
    }

    /// Raw value text, or `None` if the pattern does not match.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let (pattern, last) = match self {
            Self::LastInteger(re) => (re, true),
            Self::Phrase(re) => (re, false),
        };
        let caps = pattern.captures(text)?;
        let group = if last {
            caps.iter().skip(1).flatten().last()
        } else {
            caps.get(1)
        };
        Some(group.map_or("", |m| m.as_str()))
    }
}

/// Ordered rules for all three fields.
#[derive(Debug)]
pub struct PatternSet {
    census: Vec<Rule>,
    contact: Vec<Rule>,
    licensor: Vec<Rule>,
}

/// Contact person: "Name of Individual Informed of this Inspection: ..." to end of line
fn contact_rules() -> Vec<Rule> {
    vec![
        Rule::phrase(r"(?i)Name of Individual Informed.*?Inspection:?\s*([^\n\r]+)"),
        Rule::phrase(r"(?i)Individual Informed.*?:?\s*([A-Za-z][^\n\r]*)"),
    ]
}

/// Licensor: runs to the line break, end of text or the "OL Staff" column
fn licensor_rules() -> Vec<Rule> {
    vec![
        Rule::phrase(
            r"(?i)Licensor\(?s?\)?\s*Conducting.*?Inspection:?\s*([^\n\r]+?)(?:\s+OL Staff|[\r\n]|$)",
        ),
        Rule::phrase(r"(?i)Licensor.*?:?\s*([A-Za-z][^\n\r]*?)(?:\s+OL Staff|[\r\n]|$)"),
    ]
}

static TEXT_PATTERNS: LazyLock<PatternSet> = LazyLock::new(|| PatternSet {
    // Progressively looser separators between label and count
    census: vec![
        Rule::last_integer(r"Approved # of Present\s*\n\s*([0-9]+)"),
        Rule::last_integer(r"Approved # of Present\s+([0-9]+)"),
        Rule::last_integer(r"Approved # of Present\s+[0-9]+\s+([0-9]+)"),
        Rule::last_integer(r"Approved # of Present[^0-9]*([0-9]+)"),
    ],
    contact: contact_rules(),
    licensor: licensor_rules(),
});

static OCR_PATTERNS: LazyLock<PatternSet> = LazyLock::new(|| PatternSet {
    census: vec![Rule::last_integer(r"(?is)Present.*?([0-9]+).*?Capacity")],
    contact: contact_rules(),
    licensor: licensor_rules(),
});

impl Mode {
    pub fn patterns(self) -> &'static PatternSet {
        match self {
            Self::Text => &TEXT_PATTERNS,
            Self::Ocr => &OCR_PATTERNS,
        }
    }
}

/// Capture of the first rule that matches
fn first_capture<'t>(rules: &[Rule], text: &'t str) -> Option<&'t str> {
    rules.iter().find_map(|rule| rule.capture(text))
}

/// Digit run as a count. Runs too long for `u64` are dropped with a log line.
fn parse_census(raw: &str) -> Option<u64> {
    match raw.parse() {
        Ok(n) => Some(n),
        Err(e) => {
            log::debug!("Ignoring census {raw:?}: {e}");
            None
        }
    }
}

/// Collapse whitespace runs to single spaces and trim. Blank becomes `None`.
fn clean_phrase(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

impl PatternSet {
    pub fn extract(&self, text: &str) -> Fields {
        Fields {
            census: first_capture(&self.census, text).and_then(parse_census),
            contact_person: first_capture(&self.contact, text).and_then(clean_phrase),
            licensor: first_capture(&self.licensor, text).and_then(clean_phrase),
        }
    }
}

/// Extract fields from page text with the pattern set for `mode`.
pub fn extract_fields(text: &str, mode: Mode) -> Fields {
    if text.trim().is_empty() {
        return Fields::default();
    }
    mode.patterns().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_on_next_line() {
        let text = "Approved # of Present\n 12\nOther";
        assert_eq!(extract_fields(text, Mode::Text).census, Some(12));
    }

    #[test]
    fn census_same_line() {
        let text = "Approved # of Present 7 Capacity";
        assert_eq!(extract_fields(text, Mode::Text).census, Some(7));
    }

    #[test]
    fn census_after_words() {
        let text = "Approved # of Present Youth Census Count: 14\nNext";
        assert_eq!(extract_fields(text, Mode::Text).census, Some(14));
    }

    #[test]
    fn census_first_rule_wins() {
        // The second rule matches "16" before the third could pick "9"
        let text = "Approved # of Present 16 9";
        assert_eq!(extract_fields(text, Mode::Text).census, Some(16));
    }

    #[test]
    fn last_integer_takes_last_group() {
        let rule = Rule::last_integer(r"Approved # of Present\s+([0-9]+)\s+([0-9]+)");
        assert_eq!(rule.capture("Approved # of Present 16 9"), Some("9"));
    }

    #[test]
    fn census_label_is_case_sensitive_in_text_mode() {
        let text = "approved # of present 12";
        assert_eq!(extract_fields(text, Mode::Text).census, None);
    }

    #[test]
    fn census_beyond_u32() {
        let text = "Approved # of Present 5000000000";
        assert_eq!(extract_fields(text, Mode::Text).census, Some(5_000_000_000));
    }

    #[test]
    fn census_overflow_is_none() {
        let text = "Approved # of Present 99999999999999999999999";
        let fields = extract_fields(text, Mode::Text);
        assert_eq!(fields.census, None);
        assert!(fields.is_empty());
    }

    #[test]
    fn census_ocr_spans_lines() {
        let text = "Approved # of PRESENT\n 3 1 capacity 16";
        assert_eq!(extract_fields(text, Mode::Ocr).census, Some(3));
    }

    #[test]
    fn census_ocr_requires_capacity() {
        let text = "Present 12 youth";
        assert_eq!(extract_fields(text, Mode::Ocr).census, None);
    }

    #[test]
    fn contact_full_label() {
        let text = "Name of Individual Informed of this Inspection:   Jane    Q. Smith \nLicensor";
        assert_eq!(
            extract_fields(text, Mode::Text).contact_person.as_deref(),
            Some("Jane Q. Smith")
        );
    }

    #[test]
    fn contact_loose_label() {
        let text = "individual informed - Maria Lopez\n";
        assert_eq!(
            extract_fields(text, Mode::Text).contact_person.as_deref(),
            Some("Maria Lopez")
        );
    }

    #[test]
    fn licensor_stops_at_line_break() {
        let text = "Licensor(s) Conducting this Inspection: John Doe\nOther stuff";
        assert_eq!(
            extract_fields(text, Mode::Text).licensor.as_deref(),
            Some("John Doe")
        );
    }

    #[test]
    fn licensor_stops_at_ol_staff() {
        let text = "Licensor(s) Conducting this Inspection: John  Doe OL Staff Present: 2";
        assert_eq!(
            extract_fields(text, Mode::Ocr).licensor.as_deref(),
            Some("John Doe")
        );
    }

    #[test]
    fn licensor_at_end_of_text() {
        let text = "Licensors Conducting Inspection Ann Lee";
        assert_eq!(
            extract_fields(text, Mode::Text).licensor.as_deref(),
            Some("Ann Lee")
        );
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(extract_fields("  \n\t", Mode::Text).is_empty());
        assert!(extract_fields("", Mode::Ocr).is_empty());
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        let fields = extract_fields("Facility Name: Sunrise Ranch\nDate: 1/2/2024", Mode::Text);
        assert!(fields.is_empty());
    }

    #[test]
    fn fields_independent() {
        let text = "Name of Individual Informed of this Inspection: Pat Kim\n";
        let fields = extract_fields(text, Mode::Text);
        assert_eq!(fields.census, None);
        assert_eq!(fields.contact_person.as_deref(), Some("Pat Kim"));
        assert_eq!(fields.licensor, None);
        assert!(!fields.is_empty());
    }

    #[test]
    fn clean_phrase_collapses_and_trims() {
        assert_eq!(clean_phrase("  a \t b\u{a0} c "), Some("a b c".to_string()));
        assert_eq!(clean_phrase("   "), None);
    }
}
