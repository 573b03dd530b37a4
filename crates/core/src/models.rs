use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The closed set of document categories the corpus is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    S,
    Hr,
    Hconres,
    Hjres,
    Hres,
    Sconres,
    Sjres,
    Sres,
}

impl BillType {
    pub const ALL: [BillType; 8] = [
        BillType::S,
        BillType::Hr,
        BillType::Hconres,
        BillType::Hjres,
        BillType::Hres,
        BillType::Sconres,
        BillType::Sjres,
        BillType::Sres,
    ];

    /// The partition key. Lower-casing happens here and nowhere else.
    pub fn as_str(self) -> &'static str {
        match self {
            BillType::S => "s",
            BillType::Hr => "hr",
            BillType::Hconres => "hconres",
            BillType::Hjres => "hjres",
            BillType::Hres => "hres",
            BillType::Sconres => "sconres",
            BillType::Sjres => "sjres",
            BillType::Sres => "sres",
        }
    }

    pub fn parse(raw: &str) -> Option<BillType> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "s" => Some(BillType::S),
            "hr" => Some(BillType::Hr),
            "hconres" => Some(BillType::Hconres),
            "hjres" => Some(BillType::Hjres),
            "hres" => Some(BillType::Hres),
            "sconres" => Some(BillType::Sconres),
            "sjres" => Some(BillType::Sjres),
            "sres" => Some(BillType::Sres),
            _ => None,
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSummary {
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAction {
    pub acted_at: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSponsor {
    pub name: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

/// The canonical record every source format converges to. Immutable once an
/// adapter has built it; the loader only serializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: String,
    pub congress: u16,
    pub bill_type: BillType,
    pub number: String,
    pub introduced_at: Option<NaiveDate>,
    pub summary: Option<BillSummary>,
    pub actions: Vec<BillAction>,
    pub sponsors: Vec<BillSponsor>,
    pub cosponsors: Vec<BillSponsor>,
    pub status_at: String,
    pub short_title: String,
    pub official_title: String,
}

impl Bill {
    pub fn composite_id(congress: u16, bill_type: BillType, number: &str) -> String {
        format!("{}-{}-{}", congress, bill_type.as_str(), number)
    }
}

/// Source dates arrive either as plain `%Y-%m-%d` or as an RFC 3339 timestamp;
/// both collapse to one calendar-date representation.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

/// What to do with a document that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilePolicy {
    /// Log the failure, leave the slot empty, keep the batch going.
    #[default]
    Skip,
    /// Fail the category (and the run) on the first bad document.
    Abort,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub first_congress: u16,
    pub last_congress: u16,
    /// Parse jobs allowed in flight across the whole run, not per category.
    pub parallel_parses: usize,
    pub parse_timeout: Duration,
    pub file_policy: FilePolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            first_congress: 93,
            last_congress: 117,
            parallel_parses: 64,
            parse_timeout: Duration::from_secs(60),
            file_policy: FilePolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_date, Bill, BillType};

    #[test]
    fn bill_type_parsing_normalizes_case_and_whitespace() {
        assert_eq!(BillType::parse("S"), Some(BillType::S));
        assert_eq!(BillType::parse("s"), Some(BillType::S));
        assert_eq!(BillType::parse("S "), Some(BillType::S));
        assert_eq!(BillType::parse("HCONRES"), Some(BillType::Hconres));
        assert_eq!(BillType::parse("senate-bill"), None);
        assert_eq!(BillType::parse(""), None);
    }

    #[test]
    fn partition_key_is_lowercase() {
        for bill_type in BillType::ALL {
            let key = bill_type.as_str();
            assert_eq!(key, key.to_lowercase());
        }
    }

    #[test]
    fn composite_id_joins_the_identity_triple() {
        assert_eq!(Bill::composite_id(117, BillType::Hjres, "31"), "117-hjres-31");
    }

    #[test]
    fn dates_collapse_to_one_representation() {
        let plain = normalize_date("2021-04-22").expect("plain date should parse");
        let stamped = normalize_date("2021-04-22T14:12:46Z").expect("timestamp should parse");
        assert_eq!(plain, stamped);
        assert_eq!(plain.format("%Y-%m-%d").to_string(), "2021-04-22");
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("  "), None);
        assert_eq!(normalize_date("April 22, 2021"), None);
    }
}
