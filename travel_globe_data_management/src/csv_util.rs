use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

// Header aliases, matched case-insensitively. Earlier aliases win.
pub const DATE_COLUMNS: &[&str] = &["date"];
pub const LOCATION_COLUMNS: &[&str] = &["location", "place"];
pub const COMMENTS_COLUMNS: &[&str] = &["comments"];
pub const COLOR_COLUMNS: &[&str] = &["color"];

/// One data row. Blank cells read as `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CsvRow {
    pub line: u64,
    pub date: Option<String>,
    pub location: Option<String>,
    pub comments: Option<String>,
    pub color: Option<String>,
}

struct Columns {
    date: Option<usize>,
    location: Option<usize>,
    comments: Option<usize>,
    color: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self {
            date: find_column(headers, DATE_COLUMNS),
            location: find_column(headers, LOCATION_COLUMNS),
            comments: find_column(headers, COMMENTS_COLUMNS),
            color: find_column(headers, COLOR_COLUMNS),
        }
    }
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|header| header.eq_ignore_ascii_case(alias)))
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|index| record.get(index))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Reads a headed CSV. Cells are trimmed and blank lines skipped.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        rows.push(CsvRow {
            line: record.position().map_or(0, |position| position.line()),
            date: cell(&record, columns.date),
            location: cell(&record, columns.location),
            comments: cell(&record, columns.comments),
            color: cell(&record, columns.color),
        });
    }

    Ok(rows)
}
