//! Comma-delimited reader/writer built on the `csv` crate.

use crate::model::record::RawRecord;
use thiserror::Error;

pub const DELIMITER: u8 = b',';

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("malformed delimited text{}: {message}", line_suffix(.line))]
    Parse { line: Option<u64>, message: String },
    #[error("failed to write delimited text: {0}")]
    Write(String),
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|line| format!(" at line {line}"))
        .unwrap_or_default()
}

impl From<csv::Error> for NormalizeError {
    fn from(value: csv::Error) -> Self {
        Self::Parse {
            line: value.position().map(|position| position.line()),
            message: value.to_string(),
        }
    }
}

/// Parses a delimited payload into raw records keyed by header field.
///
/// When the literal line `expected_columns.join(",")` does not occur anywhere
/// in the decoded text, the payload is treated as headerless and that line is
/// prepended. The check is a substring match: a data row that happens to
/// contain the header text suppresses the prepend.
///
/// # Errors
/// - `Encoding` when the bytes are not UTF-8.
/// - `Parse` on an unterminated quoted field or any reader failure.
pub fn normalize(
    raw_bytes: &[u8],
    expected_columns: &[&str],
) -> Result<Vec<RawRecord>, NormalizeError> {
    let decoded = std::str::from_utf8(raw_bytes)?;
    let header = expected_columns.join(&char::from(DELIMITER).to_string());

    let text = if decoded.contains(header.as_str()) {
        decoded.to_string()
    } else {
        format!("{header}\n{decoded}")
    };

    ensure_quotes_balanced(&text)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .collect::<RawRecord>(),
        );
    }

    Ok(records)
}

/// Writes records as headerless delimited rows, fields in `columns` order.
///
/// Fields absent from a record are written empty.
pub fn to_delimited_bytes(
    records: &[RawRecord],
    columns: &[&str],
) -> Result<Vec<u8>, NormalizeError> {
    write_delimited(Vec::new(), records, columns)
}

/// Same as [`to_delimited_bytes`], into any sink; returns the sink when done.
///
/// # Errors
/// `Write` when the sink rejects bytes, on any row or on the final flush.
pub fn write_delimited<W: std::io::Write>(
    sink: W,
    records: &[RawRecord],
    columns: &[&str],
) -> Result<W, NormalizeError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(sink);

    for record in records {
        writer
            .write_record(columns.iter().map(|column| record.get(column).unwrap_or("")))
            .map_err(|err| NormalizeError::Write(err.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|err| NormalizeError::Write(err.to_string()))
}

// A quote opens a quoted field only at the start of a field; inside one,
// `""` is an escaped quote. Quotes within unquoted fields are literal.
fn ensure_quotes_balanced(text: &str) -> Result<(), NormalizeError> {
    let delimiter = char::from(DELIMITER);
    let mut open_line = None;
    let mut field_start = true;
    let mut line = 1u64;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if open_line.is_some() {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => open_line = None,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if field_start => open_line = Some(line),
            '\n' => {
                line += 1;
                field_start = true;
                continue;
            }
            ch if ch == delimiter => {
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
    }

    match open_line {
        Some(line) => Err(NormalizeError::Parse {
            line: Some(line),
            message: "unterminated quoted field".to_string(),
        }),
        None => Ok(()),
    }
}
