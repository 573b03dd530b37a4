use crate::adapters::parse_identity;
use crate::error::IngestError;
use crate::models::{normalize_date, Bill, BillAction, BillSponsor, BillSummary};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the structured status document inside an item directory. Its
/// presence decides the item's format.
pub const STATUS_XML_FILE: &str = "fdsys_billstatus.xml";

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    bill: StatusBill,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StatusBill {
    bill_number: String,
    bill_type: String,
    introduced_date: String,
    congress: String,
    summaries: StatusSummaries,
    actions: StatusActions,
    sponsors: StatusPeople,
    cosponsors: StatusPeople,
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusSummaries {
    #[serde(rename = "billSummaries")]
    bill_summaries: StatusSummaryList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusSummaryList {
    #[serde(rename = "item")]
    items: Vec<StatusSummaryItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusSummaryItem {
    #[serde(rename = "lastSummaryUpdateDate")]
    date: String,
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusActions {
    #[serde(rename = "item")]
    items: Vec<StatusActionItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusActionItem {
    #[serde(rename = "actionDate")]
    acted_at: String,
    text: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusPeople {
    #[serde(rename = "item")]
    items: Vec<StatusPerson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusPerson {
    #[serde(rename = "fullName")]
    full_name: String,
    state: String,
}

/// Parse one `billStatus` XML document into the canonical record.
pub fn parse_status_xml(path: &Path) -> Result<Bill, IngestError> {
    let raw = fs::read_to_string(path).map_err(|error| malformed(path, &error.to_string()))?;
    let envelope: StatusEnvelope =
        quick_xml::de::from_str(&raw).map_err(|error| malformed(path, &error.to_string()))?;
    build(path, envelope.bill)
}

fn malformed(path: &Path, reason: &str) -> IngestError {
    IngestError::MalformedDocument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn build(path: &Path, doc: StatusBill) -> Result<Bill, IngestError> {
    let (congress, bill_type, number) =
        parse_identity(path, &doc.congress, &doc.bill_type, &doc.bill_number)?;

    // Status comes from the first action in document order; with no actions
    // there is nothing to derive it from.
    let status_at = doc
        .actions
        .items
        .first()
        .map(|action| action.acted_at.clone())
        .ok_or_else(|| IngestError::MissingActions {
            path: path.to_path_buf(),
        })?;

    // Zero or many summary snapshots may be present; only the first counts.
    let summary = doc
        .summaries
        .bill_summaries
        .items
        .into_iter()
        .next()
        .map(|item| BillSummary {
            date: item.date,
            text: item.text,
        });

    let actions = doc
        .actions
        .items
        .into_iter()
        .map(|item| BillAction {
            acted_at: item.acted_at,
            text: item.text,
            kind: item.kind,
        })
        .collect();

    let sponsors = doc.sponsors.items.into_iter().map(raw_person).collect();
    let cosponsors = doc.cosponsors.items.into_iter().map(raw_person).collect();

    Ok(Bill {
        bill_id: Bill::composite_id(congress, bill_type, &number),
        congress,
        bill_type,
        number,
        introduced_at: normalize_date(&doc.introduced_date),
        summary,
        actions,
        sponsors,
        cosponsors,
        status_at,
        short_title: doc.title.clone(),
        // This format has no distinct official title.
        official_title: doc.title,
    })
}

// Sponsor entries in this format carry no party or title; names stay raw.
fn raw_person(person: StatusPerson) -> BillSponsor {
    BillSponsor {
        name: person.full_name,
        state: person.state,
        party: None,
        district: None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_status_xml;
    use crate::error::IngestError;
    use crate::models::BillType;
    use std::fs;
    use tempfile::tempdir;

    const FULL_STATUS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<billStatus>
  <bill>
    <billNumber>2</billNumber>
    <billType>HR</billType>
    <introducedDate>2021-01-28</introducedDate>
    <congress>117</congress>
    <summaries>
      <billSummaries>
        <item>
          <lastSummaryUpdateDate>2021-02-02T18:37:22Z</lastSummaryUpdateDate>
          <text>First summary.</text>
        </item>
        <item>
          <lastSummaryUpdateDate>2021-03-01T00:00:00Z</lastSummaryUpdateDate>
          <text>Second summary.</text>
        </item>
      </billSummaries>
    </summaries>
    <actions>
      <item>
        <actionDate>2021-01-28</actionDate>
        <text>Introduced in House</text>
        <type>IntroReferral</type>
      </item>
      <item>
        <actionDate>2021-02-02</actionDate>
        <text>Referred to committee</text>
        <type>Committee</type>
      </item>
    </actions>
    <sponsors>
      <item>
        <fullName>Rep. Doe, Jane [D-CA-12]</fullName>
        <state>CA</state>
        <party>D</party>
      </item>
    </sponsors>
    <cosponsors>
      <item>
        <fullName>Rep. Roe, Rick [R-TX-4]</fullName>
        <state>TX</state>
        <party>R</party>
      </item>
    </cosponsors>
    <title>Example Act of 2021</title>
  </bill>
</billStatus>
"#;

    const NO_ACTIONS_STATUS: &str = r#"<?xml version="1.0"?>
<billStatus>
  <bill>
    <billNumber>9</billNumber>
    <billType>sres</billType>
    <congress>93</congress>
    <title>Quiet Resolution</title>
  </bill>
</billStatus>
"#;

    fn write_fixture(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("fdsys_billstatus.xml");
        fs::write(&path, contents).expect("fixture write");
        (dir, path)
    }

    #[test]
    fn full_document_maps_to_canonical_record() {
        let (_dir, path) = write_fixture(FULL_STATUS);
        let bill = parse_status_xml(&path).expect("document should parse");

        assert_eq!(bill.bill_id, "117-hr-2");
        assert_eq!(bill.bill_type, BillType::Hr);
        assert_eq!(bill.number, "2");
        assert_eq!(
            bill.introduced_at.map(|date| date.to_string()),
            Some("2021-01-28".to_string())
        );

        let summary = bill.summary.expect("first summary should be retained");
        assert_eq!(summary.text, "First summary.");

        assert_eq!(bill.actions.len(), 2);
        assert_eq!(bill.actions[0].text, "Introduced in House");
        assert_eq!(bill.status_at, "2021-01-28");

        assert_eq!(bill.sponsors.len(), 1);
        assert_eq!(bill.sponsors[0].name, "Rep. Doe, Jane [D-CA-12]");
        assert_eq!(bill.sponsors[0].state, "CA");
        assert_eq!(bill.sponsors[0].party, None);
        assert_eq!(bill.cosponsors.len(), 1);
        assert_eq!(bill.cosponsors[0].state, "TX");

        assert_eq!(bill.short_title, "Example Act of 2021");
        assert_eq!(bill.official_title, bill.short_title);
    }

    #[test]
    fn empty_actions_is_a_typed_failure() {
        let (_dir, path) = write_fixture(NO_ACTIONS_STATUS);
        let error = parse_status_xml(&path).unwrap_err();
        assert!(matches!(error, IngestError::MissingActions { .. }));
    }

    #[test]
    fn unreadable_file_is_malformed_with_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing.xml");
        let error = parse_status_xml(&path).unwrap_err();
        match error {
            IngestError::MalformedDocument { path: tagged, .. } => assert_eq!(tagged, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_content_is_malformed() {
        let (_dir, path) = write_fixture("this is not xml at all");
        let error = parse_status_xml(&path).unwrap_err();
        assert!(matches!(error, IngestError::MalformedDocument { .. }));
    }
}
