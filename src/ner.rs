//! Named Entity Recognition for legal documents.
//!
//! A pattern-matching recognizer tuned for contracts, filings, and
//! court opinions. High precision on its target domain, no external
//! models or runtime dependencies, and a useful default when no LLM
//! backend is configured. Emits the same `EntitySpan` stream as any
//! other `EntityRecognizer`, so the aggregator treats it identically.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::analysis::{CapabilityError, EntityRecognizer, EntitySpan};

/// Entity-type labels emitted by the regex recognizer.
pub mod labels {
    pub const ORG: &str = "ORG";
    pub const PERSON: &str = "PERSON";
    pub const COURT: &str = "COURT";
    pub const CASE_NUMBER: &str = "CASE_NUMBER";
    pub const STATUTE: &str = "STATUTE";
    pub const MONEY: &str = "MONEY";
}

/// Regex-based entity recognizer for legal documents.
///
/// Extracts organizations (corporate suffixes), persons (titled and
/// capitalized names), courts, case/docket numbers, statute citations,
/// and monetary amounts.
pub struct RegexRecognizer;

impl RegexRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Extract entity spans from text, in document order per category.
    pub fn extract(&self, text: &str) -> Vec<EntitySpan> {
        let mut seen = HashSet::new();
        let mut spans = Vec::new();

        extract_courts(text, &mut spans, &mut seen);
        extract_organizations(text, &mut spans, &mut seen);
        extract_persons(text, &mut spans, &mut seen);
        extract_case_numbers(text, &mut spans, &mut seen);
        extract_statutes(text, &mut spans, &mut seen);
        extract_money(text, &mut spans, &mut seen);

        spans
    }
}

impl Default for RegexRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityRecognizer for RegexRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, CapabilityError> {
        Ok(self.extract(text))
    }
}

// ============================================================================
// Court patterns
// ============================================================================

static COURT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:United States |U\.S\. )?(?:Supreme Court|Court of Appeals|District Court|Bankruptcy Court|Tax Court|Court of Federal Claims|Superior Court|Circuit Court|Court of Chancery)(?:\s+(?:of|for)\s+(?:the\s+)?[A-Z][A-Za-z]+(?:\s+(?:of|District\s+of)?\s*[A-Z][A-Za-z]+)*)?)",
    )
    .expect("court pattern should compile")
});

// ============================================================================
// Organization patterns
// ============================================================================

static ORG_SUFFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z&'\-]+(?:\s+[A-Z][A-Za-z&'\-]+){0,4}(?:,)?\s+(?:Inc\.?|LLC|L\.L\.C\.|LLP|L\.L\.P\.|Ltd\.?|L\.P\.|Corp\.?|Corporation|Company|Co\.|Holdings|Partners|Group|Bank|Trust|Association))",
    )
    .expect("org suffix pattern should compile")
});

static KNOWN_ORGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "SEC", "FTC", "DOJ", "IRS", "FINRA", "CFTC", "FDIC", "EPA", "NLRB", "EEOC", "USPTO",
        "Securities and Exchange Commission",
        "Federal Trade Commission",
        "Department of Justice",
        "Internal Revenue Service",
        "American Arbitration Association",
    ]
    .into_iter()
    .collect()
});

// ============================================================================
// Person name patterns
// ============================================================================

static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:Judge|Justice|Chief Justice|Magistrate Judge|Attorney|Counsel|Arbitrator|Mediator|Hon\.|Dr\.|Prof\.|Mr\.|Mrs\.|Ms\.)\s+)([A-Z][a-z]+(?:\s+[A-Z]\.?)?\s+[A-Z][a-z]+)",
    )
    .expect("title pattern should compile")
});

static CAPITALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2,}(?:\s+[A-Z]\.?\s+|\s+)[A-Z][a-z]{2,})\b")
        .expect("capitalized name pattern should compile")
});

// Phrases that look like names but aren't, to reduce false positives.
static NAME_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "United States",
        "New York",
        "New Jersey",
        "North Carolina",
        "South Carolina",
        "District Court",
        "Supreme Court",
        "Appellate Division",
        "General Counsel",
        "Limited Liability",
        "Master Agreement",
        "Purchase Agreement",
        "Effective Date",
        "Governing Law",
        "Confidential Information",
        "Intellectual Property",
    ]
    .into_iter()
    .collect()
});

// ============================================================================
// Case/docket number patterns
// ============================================================================

static CASE_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Federal docket: 1:21-cv-01234, 4:19-cr-00567-ABC
        Regex::new(r"\b(\d{1,2}:\d{2}-(?:cv|cr|md|mc|bk)-\d{3,}(?:-[A-Z]{2,4})?)\b").unwrap(),
        // Case caption: No. 21-1234 / Case No. 2021-0456
        Regex::new(r"\b(?:Case\s+)?No\.\s*(\d{2,4}-\d{3,})\b").unwrap(),
    ]
});

// ============================================================================
// Statute citation patterns
// ============================================================================

static STATUTE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // U.S. Code: 15 U.S.C. § 78j(b), 42 U.S.C. §§ 1983-1985
        Regex::new(r"\b(\d+\s+U\.S\.C\.\s+§{1,2}\s*\d+[a-z]?(?:\([a-z0-9]+\))*)").unwrap(),
        // Code of Federal Regulations: 17 C.F.R. § 240.10b-5
        Regex::new(r"\b(\d+\s+C\.F\.R\.\s+§{1,2}\s*[\d.]+[a-z]?(?:-\d+)?)").unwrap(),
        // Internal references: Section 7.2, Section 10(b)
        Regex::new(r"\b(Section\s+\d+(?:\.\d+)*(?:\([a-z0-9]+\))*)\b").unwrap(),
    ]
});

// ============================================================================
// Monetary amounts
// ============================================================================

static MONEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\$[\d,]+(?:\.\d{1,2})?(?:\s+(?:million|billion))?)")
        .expect("money pattern should compile")
});

// ============================================================================
// Extraction helpers
// ============================================================================

fn push_unique(
    spans: &mut Vec<EntitySpan>,
    seen: &mut HashSet<String>,
    label: &str,
    value: &str,
) {
    let key = format!("{}:{}", label, value);
    if seen.insert(key) {
        spans.push(EntitySpan::new(label, value));
    }
}

fn extract_courts(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for cap in COURT_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            push_unique(spans, seen, labels::COURT, m.as_str().trim());
        }
    }
}

fn extract_organizations(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for cap in ORG_SUFFIX_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            push_unique(spans, seen, labels::ORG, m.as_str().trim_end_matches(','));
        }
    }

    for org in KNOWN_ORGS.iter() {
        let pattern = format!(r"\b{}\b", regex::escape(org));
        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(text) {
                push_unique(spans, seen, labels::ORG, org);
            }
        }
    }
}

fn extract_persons(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for cap in TITLE_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            if is_plausible_name(name) {
                push_unique(spans, seen, labels::PERSON, name);
            }
        }
    }

    for cap in CAPITALIZED_NAME.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            if is_plausible_name(name) && !NAME_STOPWORDS.contains(name) {
                push_unique(spans, seen, labels::PERSON, name);
            }
        }
    }
}

fn extract_case_numbers(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for pattern in CASE_NUMBER_PATTERNS.iter() {
        for cap in pattern.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                push_unique(spans, seen, labels::CASE_NUMBER, m.as_str().trim());
            }
        }
    }
}

fn extract_statutes(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for pattern in STATUTE_PATTERNS.iter() {
        for cap in pattern.captures_iter(text) {
            if let Some(m) = cap.get(1) {
                push_unique(spans, seen, labels::STATUTE, m.as_str().trim());
            }
        }
    }
}

fn extract_money(text: &str, spans: &mut Vec<EntitySpan>, seen: &mut HashSet<String>) {
    for cap in MONEY_PATTERN.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            push_unique(spans, seen, labels::MONEY, m.as_str().trim());
        }
    }
}

fn is_plausible_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 4 {
        return false;
    }
    parts.iter().all(|p| {
        let first = p.chars().next().unwrap_or('a');
        first.is_uppercase() && p.len() >= 2
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_of(spans: &[EntitySpan], label: &str) -> Vec<String> {
        spans
            .iter()
            .filter(|s| s.label == label)
            .map(|s| s.text.clone())
            .collect()
    }

    #[test]
    fn test_extract_corporate_organizations() {
        let spans = RegexRecognizer::new()
            .extract("Acme Widgets Inc. entered into an agreement with Globex Holdings.");
        let orgs = values_of(&spans, labels::ORG);
        assert!(orgs.contains(&"Acme Widgets Inc.".to_string()));
        assert!(orgs.contains(&"Globex Holdings".to_string()));
    }

    #[test]
    fn test_extract_known_agencies() {
        let spans = RegexRecognizer::new()
            .extract("The SEC and the Department of Justice opened parallel inquiries.");
        let orgs = values_of(&spans, labels::ORG);
        assert!(orgs.contains(&"SEC".to_string()));
        assert!(orgs.contains(&"Department of Justice".to_string()));
    }

    #[test]
    fn test_extract_courts() {
        let spans = RegexRecognizer::new().extract(
            "The United States District Court for the Southern District of New York granted the motion.",
        );
        let courts = values_of(&spans, labels::COURT);
        assert_eq!(courts.len(), 1);
        assert!(courts[0].starts_with("United States District Court"));
    }

    #[test]
    fn test_extract_titled_persons() {
        let spans =
            RegexRecognizer::new().extract("Judge Denise Cote presided; Attorney John Doe appeared.");
        let persons = values_of(&spans, labels::PERSON);
        assert!(persons.contains(&"Denise Cote".to_string()));
        assert!(persons.contains(&"John Doe".to_string()));
    }

    #[test]
    fn test_extract_case_numbers() {
        let spans = RegexRecognizer::new()
            .extract("See Smith v. Acme, No. 21-1234, and docket 1:21-cv-05678-LTS.");
        let cases = values_of(&spans, labels::CASE_NUMBER);
        assert!(cases.contains(&"21-1234".to_string()));
        assert!(cases.contains(&"1:21-cv-05678-LTS".to_string()));
    }

    #[test]
    fn test_extract_statutes() {
        let spans = RegexRecognizer::new()
            .extract("Claims under 15 U.S.C. § 78j(b) and 17 C.F.R. § 240.10b-5 survive. Section 7.2 controls.");
        let statutes = values_of(&spans, labels::STATUTE);
        assert!(statutes.contains(&"15 U.S.C. § 78j(b)".to_string()));
        assert!(statutes.contains(&"17 C.F.R. § 240.10b-5".to_string()));
        assert!(statutes.contains(&"Section 7.2".to_string()));
    }

    #[test]
    fn test_extract_money() {
        let spans = RegexRecognizer::new()
            .extract("Damages of $1,500,000.00 plus a penalty of $2 million were assessed.");
        let money = values_of(&spans, labels::MONEY);
        assert!(money.contains(&"$1,500,000.00".to_string()));
        assert!(money.contains(&"$2 million".to_string()));
    }

    #[test]
    fn test_stopword_phrases_not_persons() {
        let spans = RegexRecognizer::new()
            .extract("This Master Agreement is governed by the laws of New York.");
        let persons = values_of(&spans, labels::PERSON);
        assert!(!persons.contains(&"Master Agreement".to_string()));
        assert!(!persons.contains(&"New York".to_string()));
    }

    #[test]
    fn test_no_duplicate_spans() {
        let spans = RegexRecognizer::new().extract("The SEC sued. The SEC settled. The SEC moved on.");
        let count = spans.iter().filter(|s| s.text == "SEC").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(RegexRecognizer::new().extract("").is_empty());
    }
}
