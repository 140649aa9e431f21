//! Uploaded file parsing and format detection.
//!
//! Two input formats are accepted:
//!
//! - CSV with a header row.
//! - A plain-text decklist, one card per line:
//!   `"<qty> <name> (<SET>) <number>[ *F*]"`, only for `.txt` files.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{ColumnMapping, ImportError, ImportRecord, ImportRow};

/// Single-card-per-line decklist grammar.
static DECKLIST_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(.+?)\s+\((.+?)\)\s+(\d+)(?:\s+\*F\*)?$").expect("Invalid regex")
});

/// Foil marker at the end of a decklist line.
const FOIL_MARKER: &str = "*F*";

/// Column headers given to decklist rows.
pub const DECKLIST_HEADERS: [&str; 4] = ["quantity", "name", "set", "collector_number"];

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Csv,
    Decklist,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("CSV"),
            Self::Decklist => f.write_str("decklist"),
        }
    }
}

/// A parsed upload. Created once per file and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub file_name: String,
    pub format: InputFormat,
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
    /// Per-row foil marker (decklist only; all `false` for CSV).
    pub foil: Vec<bool>,
    /// Columns were inferred from the format; no user mapping needed.
    pub is_auto_mapped: bool,
}

impl ParsedFile {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Initial mapping: fixed for decklists, guessed from headers for CSV.
    #[must_use]
    pub fn initial_mapping(&self) -> ColumnMapping {
        match self.format {
            InputFormat::Decklist => ColumnMapping::decklist(),
            InputFormat::Csv => ColumnMapping::auto_detect(&self.headers),
        }
    }

    /// Convert rows to header-keyed records. Missing cells become empty
    /// strings; cells beyond the header row are dropped.
    #[must_use]
    pub fn records(&self) -> Vec<ImportRecord> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

/// Parse an uploaded file.
///
/// # Errors
///
/// Returns [`ImportError::EmptyFile`] when the file has no non-empty lines,
/// [`ImportError::NoRows`] when no data rows were found, and
/// [`ImportError::Csv`] when the CSV reader fails.
pub fn parse_file(file_name: &str, text: &str) -> Result<ParsedFile, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next().ok_or(ImportError::EmptyFile)?;

    let parsed = if is_txt(file_name) && DECKLIST_LINE_RE.is_match(first) {
        parse_decklist(file_name, text)
    } else {
        parse_csv(file_name, text)?
    };

    if parsed.is_empty() {
        return Err(ImportError::NoRows {
            format: parsed.format,
        });
    }
    Ok(parsed)
}

fn is_txt(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Parse every line with the decklist grammar, dropping lines that do not match.
fn parse_decklist(file_name: &str, text: &str) -> ParsedFile {
    let mut rows = Vec::new();
    let mut foil = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(caps) = DECKLIST_LINE_RE.captures(line) else {
            continue;
        };
        let cell = |i: usize| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string());
        rows.push(vec![cell(1), cell(2), cell(3), cell(4)]);
        foil.push(line.ends_with(FOIL_MARKER));
    }

    ParsedFile {
        file_name: file_name.to_string(),
        format: InputFormat::Decklist,
        headers: DECKLIST_HEADERS.iter().map(ToString::to_string).collect(),
        rows,
        foil,
        is_auto_mapped: true,
    }
}

/// First non-empty line is the header; every other non-empty line is one
/// data row of any width.
fn parse_csv(file_name: &str, text: &str) -> Result<ParsedFile, ImportError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let headers = lines.next().map(parse_csv_line).transpose()?.unwrap_or_default();
    let rows = lines.map(parse_csv_line).collect::<Result<Vec<ImportRow>, _>>()?;
    let foil = vec![false; rows.len()];

    Ok(ParsedFile {
        file_name: file_name.to_string(),
        format: InputFormat::Csv,
        headers,
        rows,
        foil,
        is_auto_mapped: false,
    })
}

/// Split one line into cells. Each line is read on its own, so an
/// unbalanced quote cannot pull the following lines into its field.
fn parse_csv_line(line: &str) -> Result<ImportRow, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let record = reader.records().next().transpose()?;
    Ok(record.map_or_else(
        || vec![String::new()],
        |record| record.iter().map(ToString::to_string).collect(),
    ))
}
