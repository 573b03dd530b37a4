use crate::adapters::parse_identity;
use crate::error::IngestError;
use crate::models::{normalize_date, Bill, BillAction, BillSponsor, BillSummary};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the flat JSON document inside an item directory. Used when no
/// structured status file is present.
pub const DATA_JSON_FILE: &str = "data.json";

#[derive(Debug, Deserialize)]
struct RawBill {
    #[serde(default)]
    number: String,
    #[serde(default)]
    bill_type: String,
    #[serde(default)]
    introduced_at: String,
    #[serde(default)]
    congress: String,
    #[serde(default)]
    summary: Option<RawSummary>,
    #[serde(default)]
    actions: Vec<RawAction>,
    #[serde(default)]
    sponsor: Option<RawPerson>,
    #[serde(default)]
    cosponsors: Vec<RawPerson>,
    #[serde(default)]
    status_at: String,
    #[serde(default)]
    short_title: Option<String>,
    #[serde(default)]
    official_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(default)]
    date: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default)]
    acted_at: String,
    #[serde(default)]
    text: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    district: Option<String>,
}

/// Parse one flat JSON document into the canonical record.
pub fn parse_data_json(path: &Path) -> Result<Bill, IngestError> {
    let raw = fs::read(path).map_err(|error| malformed(path, &error.to_string()))?;
    let doc: RawBill =
        serde_json::from_slice(&raw).map_err(|error| malformed(path, &error.to_string()))?;
    build(path, doc)
}

fn malformed(path: &Path, reason: &str) -> IngestError {
    IngestError::MalformedDocument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn build(path: &Path, doc: RawBill) -> Result<Bill, IngestError> {
    let (congress, bill_type, number) =
        parse_identity(path, &doc.congress, &doc.bill_type, &doc.number)?;

    let sponsors = doc
        .sponsor
        .iter()
        .map(formatted_person)
        .collect::<Vec<_>>();
    let cosponsors = doc.cosponsors.iter().map(formatted_person).collect();

    Ok(Bill {
        bill_id: Bill::composite_id(congress, bill_type, &number),
        congress,
        bill_type,
        number,
        introduced_at: normalize_date(&doc.introduced_at),
        summary: doc.summary.map(|summary| BillSummary {
            date: summary.date,
            text: summary.text,
        }),
        actions: doc
            .actions
            .into_iter()
            .map(|action| BillAction {
                acted_at: action.acted_at,
                text: action.text,
                kind: action.kind,
            })
            .collect(),
        sponsors,
        cosponsors,
        // Already present in this format, no derivation needed.
        status_at: doc.status_at,
        short_title: doc.short_title.unwrap_or_default(),
        official_title: doc.official_title.unwrap_or_default(),
    })
}

/// `"{title} {name} [{state}]"` when a title is present, else `"{name} [{state}]"`.
fn formatted_person(person: &RawPerson) -> BillSponsor {
    let name = match person
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
    {
        Some(title) => format!("{} {} [{}]", title, person.name, person.state),
        None => format!("{} [{}]", person.name, person.state),
    };

    BillSponsor {
        name,
        state: person.state.clone(),
        party: person.party.clone(),
        district: person.district.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_data_json;
    use crate::error::IngestError;
    use crate::models::BillType;
    use std::fs;
    use tempfile::tempdir;

    const FULL_BILL: &str = r#"{
        "number": "1",
        "bill_type": "s",
        "introduced_at": "2013-01-23",
        "congress": "113",
        "summary": {"date": "2013-01-23", "text": "A bill to do things."},
        "actions": [
            {"acted_at": "2013-01-23", "text": "Read twice", "type": "referral"},
            {"acted_at": "2013-02-01", "text": "Hearings held", "type": ""}
        ],
        "sponsor": {"title": "Sen.", "name": "Jane Doe", "state": "CA", "district": null},
        "cosponsors": [
            {"name": "Rick Roe", "state": "TX", "title": null, "district": "4"}
        ],
        "status_at": "2013-02-01",
        "short_title": "Things Act",
        "official_title": "A bill to do things."
    }"#;

    fn write_fixture(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        fs::write(&path, contents).expect("fixture write");
        (dir, path)
    }

    #[test]
    fn full_document_maps_to_canonical_record() {
        let (_dir, path) = write_fixture(FULL_BILL);
        let bill = parse_data_json(&path).expect("document should parse");

        assert_eq!(bill.bill_id, "113-s-1");
        assert_eq!(bill.bill_type, BillType::S);
        assert_eq!(bill.status_at, "2013-02-01");
        assert_eq!(bill.actions.len(), 2);
        assert_eq!(bill.actions[1].kind, "");
        assert_eq!(bill.short_title, "Things Act");
        assert_eq!(bill.official_title, "A bill to do things.");
        assert_eq!(
            bill.summary.expect("summary should be kept").text,
            "A bill to do things."
        );
    }

    #[test]
    fn sponsor_title_feeds_the_display_name() {
        let (_dir, path) = write_fixture(FULL_BILL);
        let bill = parse_data_json(&path).expect("document should parse");

        assert_eq!(bill.sponsors.len(), 1);
        assert_eq!(bill.sponsors[0].name, "Sen. Jane Doe [CA]");
        assert_eq!(bill.sponsors[0].state, "CA");
    }

    #[test]
    fn cosponsor_without_title_keeps_the_short_form() {
        let (_dir, path) = write_fixture(FULL_BILL);
        let bill = parse_data_json(&path).expect("document should parse");

        assert_eq!(bill.cosponsors.len(), 1);
        assert_eq!(bill.cosponsors[0].name, "Rick Roe [TX]");
        assert_eq!(bill.cosponsors[0].district.as_deref(), Some("4"));
    }

    #[test]
    fn absent_actions_do_not_fail_this_format() {
        let (_dir, path) = write_fixture(
            r#"{"number": "7", "bill_type": "hres", "congress": "101", "status_at": "1990-01-03"}"#,
        );
        let bill = parse_data_json(&path).expect("document should parse");
        assert!(bill.actions.is_empty());
        assert!(bill.sponsors.is_empty());
        assert_eq!(bill.status_at, "1990-01-03");
    }

    #[test]
    fn truncated_json_is_malformed_with_path() {
        let (_dir, path) = write_fixture(r#"{"number": "1", "bill_type""#);
        let error = parse_data_json(&path).unwrap_err();
        match error {
            IngestError::MalformedDocument { path: tagged, .. } => assert_eq!(tagged, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
