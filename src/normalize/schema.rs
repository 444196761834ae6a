// Raw-table extraction: delimiter vote, header and units-row location,
// column dedup, and row tokenization. Everything here works on text; the
// numeric coercion lives in the module root.

use std::collections::HashMap;

use log::debug;

use super::units;
use crate::errors::ApexlineError;

/// Delimiters considered by the majority vote, in tie-break order.
const DELIMITER_CANDIDATES: [char; 4] = [',', '\t', ';', '|'];
/// Lines sampled for the delimiter vote
const SNIFF_LINES: usize = 30;
/// Lines scanned for the header row; exports put 10-20 metadata lines first
const HEADER_SCAN_LINES: usize = 80;
/// A header row must carry at least this many fields
const MIN_HEADER_FIELDS: usize = 5;
/// Fraction of tokens that must read as units for a row to count as the
/// units row
const UNIT_TOKEN_RATIO: f64 = 0.4;

/// Text table cut out of a raw export: deduplicated lower-case column names,
/// the column -> canonical unit map when a units row was present, and the
/// still-unparsed data rows.
#[derive(Clone, Debug, Default)]
pub(crate) struct RawTable {
    pub columns: Vec<String>,
    pub units: HashMap<String, String>,
    pub rows: Vec<Vec<String>>,
}

/// Majority vote over the first [`SNIFF_LINES`] lines among the candidate
/// delimiters.
pub(crate) fn guess_delimiter(lines: &[String]) -> char {
    let sample = &lines[..lines.len().min(SNIFF_LINES)];
    let mut best = DELIMITER_CANDIDATES[0];
    let mut best_count = 0usize;
    for candidate in DELIMITER_CANDIDATES {
        let count = sample
            .iter()
            .map(|line| line.matches(candidate).count())
            .sum();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

fn tokenize(line: &str, delimiter: char) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(delimiter)
        .map(|token| token.trim().to_string())
        .collect()
}

/// A header row carries a time-prefixed token and enough fields to be a
/// data table rather than a metadata line.
fn is_header_row(tokens: &[String]) -> bool {
    tokens.len() >= MIN_HEADER_FIELDS
        && tokens
            .iter()
            .any(|token| token.to_lowercase().starts_with("time"))
}

fn is_units_row(tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let matches = tokens
        .iter()
        .filter(|token| units::is_unit_token(token))
        .count();
    matches as f64 / tokens.len() as f64 >= UNIT_TOKEN_RATIO
}

/// Locate the header row and, when the row right below it reads as units,
/// the units row. Returns `(header_idx, Option<units_idx>)`.
fn find_header(lines: &[String], delimiter: char) -> Option<(usize, Option<usize>)> {
    let end = lines.len().min(HEADER_SCAN_LINES);
    for (idx, line) in lines[..end].iter().enumerate() {
        let tokens = tokenize(line, delimiter);
        if !is_header_row(&tokens) {
            continue;
        }
        let units_idx = lines
            .get(idx + 1)
            .filter(|next| is_units_row(&tokenize(next, delimiter)))
            .map(|_| idx + 1);
        return Some((idx, units_idx));
    }
    None
}

/// Repeated column names get an incrementing suffix so every column keys
/// uniquely.
pub(crate) fn deduplicate_columns(names: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let key = name.trim().to_lowercase();
        match seen.get_mut(&key) {
            Some(count) => {
                *count += 1;
                out.push(format!("{key}_{count}"));
            }
            None => {
                seen.insert(key.clone(), 0);
                out.push(key);
            }
        }
    }
    out
}

/// Cut the data table out of the raw lines. Malformed rows (field count not
/// matching the header) are skipped rather than aborting the parse.
pub(crate) fn parse_table(lines: &[String], delimiter: char) -> Result<RawTable, ApexlineError> {
    let (header_idx, units_idx) = find_header(lines, delimiter).ok_or(ApexlineError::HeaderNotFound)?;

    let columns = deduplicate_columns(&tokenize(&lines[header_idx], delimiter));

    let mut units = HashMap::new();
    if let Some(units_idx) = units_idx {
        let unit_tokens = tokenize(&lines[units_idx], delimiter);
        for (column, token) in columns.iter().zip(unit_tokens.iter()) {
            if let Some(unit) = units::normalize_unit(token) {
                units.insert(column.clone(), unit);
            }
        }
    }

    let data_start = units_idx.map_or(header_idx + 1, |idx| idx + 1);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in &lines[data_start..] {
        if line.trim().is_empty() {
            continue;
        }
        let tokens = tokenize(line, delimiter);
        if tokens.len() == columns.len() {
            rows.push(tokens);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} malformed rows while parsing export");
    }

    Ok(RawTable {
        columns,
        units,
        rows,
    })
}
