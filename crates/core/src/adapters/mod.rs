pub mod json;
pub mod xml;

pub use json::{parse_data_json, DATA_JSON_FILE};
pub use xml::{parse_status_xml, STATUS_XML_FILE};

use crate::error::IngestError;
use crate::models::BillType;
use std::path::Path;

/// Validates the identity triple shared by both source formats.
pub(crate) fn parse_identity(
    path: &Path,
    congress: &str,
    bill_type: &str,
    number: &str,
) -> Result<(u16, BillType, String), IngestError> {
    let congress = congress.trim();
    if congress.is_empty() {
        return Err(IngestError::MissingIdentity {
            path: path.to_path_buf(),
            field: "congress",
        });
    }
    let congress: u16 = congress.parse().map_err(|_| IngestError::MalformedDocument {
        path: path.to_path_buf(),
        reason: format!("congress is not a number: {congress:?}"),
    })?;

    if bill_type.trim().is_empty() {
        return Err(IngestError::MissingIdentity {
            path: path.to_path_buf(),
            field: "bill_type",
        });
    }
    let bill_type = BillType::parse(bill_type).ok_or_else(|| IngestError::MalformedDocument {
        path: path.to_path_buf(),
        reason: format!("unknown bill type: {bill_type:?}"),
    })?;

    let number = number.trim();
    if number.is_empty() {
        return Err(IngestError::MissingIdentity {
            path: path.to_path_buf(),
            field: "number",
        });
    }

    Ok((congress, bill_type, number.to_string()))
}
