//! Fixed library of private-information patterns
//!
//! Applied after the per-language category patterns, in this exact order.
//! Later patterns scan the already-partially-masked text, so reordering
//! changes which matches can still be found.

use once_cell::sync::Lazy;
use regex::Regex;

/// One compiled private-information pattern.
#[derive(Debug)]
pub struct PiiPattern {
    pub regex: Regex,
    pub description: &'static str,
}

impl PiiPattern {
    fn new(pattern: &str, description: &'static str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid PII pattern"),
            description,
        }
    }
}

static PII_PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        PiiPattern::new(
            r"(?:\+?\d{1,2}\s?)?1?[-.]?\s?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}",
            "Phone numbers (including international formats)",
        ),
        PiiPattern::new(
            r"\b[A-Za-z]\s*\d\s*[A-Za-z][ -]?\s*\d\s*[A-Za-z]\s*\d\b",
            "Canadian postal codes (with flexible spacing)",
        ),
        PiiPattern::new(
            r"[A-Za-z0-9_\-.]+\s*@\s*[A-Za-z0-9_\-.]+[.,][A-Za-z]{1,5}",
            "Email addresses (with flexible spacing and punctuation)",
        ),
        PiiPattern::new(r"\b[A-Za-z]{2}\s*\d{6}\b", "Passport numbers"),
        PiiPattern::new(
            r"(?i)\b(?:name|nom)\s*(?:is|:)\s+[A-Za-z]+(?:\s+[A-Za-z]+)?",
            "Names following a name-is introduction",
        ),
        PiiPattern::new(
            r"(?i)\d+\s+(?:[A-Za-z]+\s+){1,3}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Court|Ct|Lane|Ln|Way|Parkway|Pkwy|Square|Sq|Terrace|Ter|Place|Pl|Circle|Cir|Loop)\b",
            "Street addresses",
        ),
        PiiPattern::new(
            r"(?i)(?:\b(?:apt|bldg|dept|fl|hngr|lot|pier|rm|ste|slip|trlr|unit)\.?|#)\s*\d+[a-z]?\b",
            "Apartment and unit numbers",
        ),
        PiiPattern::new(r"(?i)P\.?\s?O\.?\s*Box\s+\d+", "PO boxes"),
        PiiPattern::new(
            r"(?i)\b(?:\d{1,3}(?:\.\d{1,3}){3}|[0-9A-F]{4}(?::[0-9A-F]{4}){5}(?:::|(?::0000)+))",
            "IPv4 and IPv6 addresses",
        ),
        PiiPattern::new(
            r"[^\s:/?#]+://[^/?#\s]*[^?#\s]*(?:\?[^#\s]*)?(?:#[^\s]*)?",
            "URLs",
        ),
        PiiPattern::new(
            r"\b\d{3}[-\s]?\d{3}[-\s]?\d{3}\b",
            "Canadian SIN (Social Insurance Number)",
        ),
        PiiPattern::new(
            r"\b(?:Mr\.?|Mrs\.?|Ms\.?|Miss|Dr\.?|Prof\.?|Sir|Madam|Lady|Monsieur|Madame|Mademoiselle|Docteur|Professeur)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*",
            "Names with honorific prefixes",
        ),
        PiiPattern::new(
            r"(?i)\b(?:my name is|my name's|je m'appelle|je me nomme)\s+[A-Za-z]+(?:\s+[A-Za-z]+)*",
            "Names in introduction phrases",
        ),
    ]
});

/// The ordered private-information pattern library.
pub fn pii_patterns() -> &'static [PiiPattern] {
    &PII_PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(description: &str, text: &str) -> bool {
        pii_patterns()
            .iter()
            .find(|p| p.description == description)
            .expect("pattern present")
            .regex
            .is_match(text)
    }

    #[test]
    fn test_library_has_thirteen_patterns() {
        assert_eq!(pii_patterns().len(), 13);
    }

    #[test]
    fn test_phone_numbers() {
        let desc = "Phone numbers (including international formats)";
        assert!(matches(desc, "call me at 613-555-1234"));
        assert!(matches(desc, "call me at (613) 555 1234"));
        assert!(!matches(desc, "line 23600 of my return"));
    }

    #[test]
    fn test_postal_codes() {
        let desc = "Canadian postal codes (with flexible spacing)";
        assert!(matches(desc, "K1A 0B1"));
        assert!(matches(desc, "k1a0b1"));
    }

    #[test]
    fn test_emails() {
        let desc = "Email addresses (with flexible spacing and punctuation)";
        assert!(matches(desc, "write to jane.doe@example.com please"));
        assert!(matches(desc, "jane @ example.com"));
    }

    #[test]
    fn test_sin() {
        let desc = "Canadian SIN (Social Insurance Number)";
        assert!(matches(desc, "my sin is 046 454 286"));
        assert!(matches(desc, "046-454-286"));
    }

    #[test]
    fn test_street_addresses() {
        let desc = "Street addresses";
        assert!(matches(desc, "I live at 24 Sussex Drive"));
        assert!(matches(desc, "350 King Edward Avenue"));
    }

    #[test]
    fn test_urls() {
        assert!(matches("URLs", "see https://example.com/page?x=1 for details"));
    }

    #[test]
    fn test_name_introductions() {
        assert!(matches("Names in introduction phrases", "my name is Jane Doe"));
        assert!(matches(
            "Names following a name-is introduction",
            "the name is Smith",
        ));
        assert!(matches("Names with honorific prefixes", "ask Dr. Jane Smith"));
    }
}
