//! Subject metadata from `participants.tsv`.

use serde_json::Number;

use bidsval_schema::tsv::parse_tsv;

use crate::output::SubjectMetadata;

/// Parse `participants.tsv` text into one record per data row.
///
/// Produces nothing unless both `participant_id` and `age` columns exist.
pub fn collect_subject_metadata(contents: &str) -> Vec<SubjectMetadata> {
    let columns = parse_tsv(contents);
    let (Some(ids), Some(ages)) = (columns.get("participant_id"), columns.get("age")) else {
        return Vec::new();
    };
    let sex = columns.get("sex");
    let group = columns.get("group");

    ids.iter()
        .zip(ages)
        .enumerate()
        .map(|(row, (id, age))| SubjectMetadata {
            participant_id: id.strip_prefix("sub-").unwrap_or(id).to_string(),
            age: parse_age(age),
            sex: sex.and_then(|column| column.get(row).cloned()),
            group: group.and_then(|column| column.get(row).cloned()),
        })
        .collect()
}

/// Ages above 89 are recorded as `89+` for de-identification.
fn parse_age(value: &str) -> Option<Number> {
    let value = value.trim();
    let value = value.strip_suffix('+').unwrap_or(value);
    if let Ok(whole) = value.parse::<i64>() {
        return Some(Number::from(whole));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}
