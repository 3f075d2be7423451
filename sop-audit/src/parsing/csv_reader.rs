//! RFC 4180 CSV reader for page-performance exports
//!
//! Header names are matched case-insensitively against a fixed column map;
//! extra columns are ignored. Rows without a URL or Title are skipped with a
//! warning, unparseable counts become 0.

use crate::error::{AuditError, AuditResult};
use crate::models::PageRecord;
use std::path::Path;
use tracing::{debug, info, warn};

/// Required header names, in the order they are reported when missing
pub const REQUIRED_COLUMNS: [&str; 4] = ["URL", "Title", "Referring domains", "Traffic"];

/// Accepted spellings of the optional publish date column
const PUBLISH_DATE_COLUMNS: [&str; 3] = ["Publish date", "publishDate", "publish_date"];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    url: usize,
    title: usize,
    referring_domains: usize,
    traffic: usize,
    publish_date: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> AuditResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| position(**col).is_none())
            .map(|col| col.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(AuditError::MissingColumns {
                missing,
                found: headers.to_vec(),
            });
        }

        // Required columns are present, checked above
        let required = |name: &str| position(name).unwrap_or_default();

        Ok(Self {
            url: required("URL"),
            title: required("Title"),
            referring_domains: required("Referring domains"),
            traffic: required("Traffic"),
            publish_date: PUBLISH_DATE_COLUMNS.iter().find_map(|name| position(*name)),
        })
    }
}

/// Split raw text into logical CSV records
///
/// Line breaks (`\r\n`, `\r` or `\n`) end a record only outside quotes, so a
/// quoted field may span lines. A quote opens a quoted section only as the
/// first non-blank character of a field; elsewhere it is a literal, so a
/// stray `"` cannot pull later rows into its record. Blank records are dropped.
pub fn split_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            current.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
                current.push(c);
            }
            ',' => {
                at_field_start = true;
                current.push(c);
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if !current.trim().is_empty() {
                    records.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                at_field_start = true;
            }
            ' ' | '\t' => current.push(c),
            _ => {
                at_field_start = false;
                current.push(c);
            }
        }
    }

    if !current.trim().is_empty() {
        records.push(current);
    }

    records
}

/// Split one CSV record into trimmed fields
///
/// Handles quoted fields, embedded commas and `""` escapes. As in
/// [`split_records`], a quote after other field content is kept literally.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' if current.trim().is_empty() => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Coerce a count field to a non-negative integer
///
/// Empty, negative or non-numeric input yields 0; decimals are truncated.
fn parse_count(raw: &str) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    if let Ok(value) = raw.parse::<u64>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

/// Parse CSV export text into page records
///
/// # Errors
/// - [`AuditError::EmptyFile`] with fewer than two non-empty records
/// - [`AuditError::MissingColumns`] naming each absent required header
/// - [`AuditError::NoValidRows`] when every data row lacks a URL or Title
pub fn parse_csv_content(content: &str) -> AuditResult<Vec<PageRecord>> {
    let records = split_records(content);
    if records.len() < 2 {
        return Err(AuditError::EmptyFile);
    }

    let headers = parse_csv_line(&records[0]);
    let columns = ColumnMap::from_headers(&headers)?;
    debug!(?columns, headers = headers.len(), "Resolved CSV columns");

    let mut pages = Vec::with_capacity(records.len() - 1);
    let mut skipped = 0usize;

    for (row_number, record) in records.iter().enumerate().skip(1) {
        let values = parse_csv_line(record);
        let field = |index: usize| values.get(index).map(String::as_str).unwrap_or("");

        let url = field(columns.url);
        let title = field(columns.title);
        if url.is_empty() || title.is_empty() {
            warn!(row = row_number, "Skipping row without URL or Title");
            skipped += 1;
            continue;
        }

        let mut page = PageRecord::new(
            url,
            title,
            parse_count(field(columns.referring_domains)),
            parse_count(field(columns.traffic)),
        );
        if let Some(index) = columns.publish_date {
            page = page.with_publish_date(field(index));
        }
        pages.push(page);
    }

    if pages.is_empty() {
        return Err(AuditError::NoValidRows);
    }

    info!(rows = pages.len(), skipped, "Parsed page records");
    Ok(pages)
}

/// Read and parse a CSV export from disk
pub fn read_csv_file(path: &Path) -> AuditResult<Vec<PageRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_csv_content(&content)
}
