/// Checkpoint table layout
///
/// One header row followed by one row per record, in discovery order.
/// Absent ids and names are stored as empty cells.
use crate::state::Record;
use csv::StringRecord;

/// Column names of the checkpoint table, in order
pub const CHECKPOINT_HEADER: [&str; 4] = ["id", "url", "name", "page"];

/// Returns an error message if `header` is not the checkpoint header
pub(crate) fn check_header(header: &StringRecord) -> Result<(), String> {
    if header.iter().eq(CHECKPOINT_HEADER.iter().copied()) {
        Ok(())
    } else {
        Err(format!(
            "expected header '{}', found '{}'",
            CHECKPOINT_HEADER.join(","),
            header.iter().collect::<Vec<_>>().join(",")
        ))
    }
}

/// Converts a record into its row cells
pub(crate) fn encode_row(record: &Record) -> [String; 4] {
    [
        record.id().unwrap_or_default().to_string(),
        record.asset_url().to_string(),
        record.label().unwrap_or_default().to_string(),
        record.page().to_string(),
    ]
}

/// Parses one data row back into a record
pub(crate) fn decode_row(row: &StringRecord) -> Result<Record, String> {
    if row.len() != CHECKPOINT_HEADER.len() {
        return Err(format!(
            "expected {} columns, found {}",
            CHECKPOINT_HEADER.len(),
            row.len()
        ));
    }

    let url = &row[1];
    if url.trim().is_empty() && row[0].trim().is_empty() {
        return Err("row has neither an id nor a url".to_string());
    }

    let page: u32 = row[3]
        .trim()
        .parse()
        .map_err(|_| format!("invalid page value '{}'", &row[3]))?;
    if page == 0 {
        return Err("page numbers start at 1".to_string());
    }

    let cell = |i: usize| Some(row[i].to_string());
    Ok(Record::new(cell(0), url, cell(2), page))
}
