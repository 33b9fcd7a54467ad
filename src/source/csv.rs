//! Comma-splitting of raw CSV text.
//!
//! Quoting is disabled: every comma is a delimiter and quote characters are ordinary data.

use std::io::Read;

use crate::error::LoadResult;

/// Header plus raw data records of one CSV input, before any typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTable {
    pub header: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// One data line split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    /// 1-based line number in the input.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Build the reader used for all CSV input.
pub(crate) fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::None);
    builder
}

/// Split `input` into a header and data records.
///
/// Each line loses its leading and trailing whitespace; whitespace around inner fields is kept.
/// Blank lines are skipped. Returns `None` when there is no header line at all.
pub(crate) fn read_raw_table<R: Read>(input: R) -> LoadResult<Option<RawTable>> {
    let mut rdr = reader_builder().from_reader(input);

    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 1);

        let mut fields: Vec<String> = record.iter().map(str::to_owned).collect();
        trim_line(&mut fields);
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }

        match header {
            None => {
                if let Some(first) = fields.first_mut() {
                    if let Some(stripped) = first.strip_prefix('\u{feff}') {
                        *first = stripped.to_owned();
                    }
                }
                header = Some(fields);
            }
            Some(_) => records.push(RawRecord { line, fields }),
        }
    }

    Ok(header.map(|header| RawTable { header, records }))
}

fn trim_line(fields: &mut [String]) {
    if let Some(first) = fields.first_mut() {
        let trimmed = first.trim_start();
        if trimmed.len() != first.len() {
            *first = trimmed.to_owned();
        }
    }
    if let Some(last) = fields.last_mut() {
        let trimmed = last.trim_end();
        if trimmed.len() != last.len() {
            *last = trimmed.to_owned();
        }
    }
}
