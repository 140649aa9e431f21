//! Re-export of rows the server rejected, in the uploaded file's own format.

use std::collections::BTreeSet;
use std::path::Path;

use super::{ImportError, InputFormat, ParsedFile};

/// Render the rows at `failed_indices` so they can be fixed and re-uploaded.
///
/// Indices are deduplicated and emitted in row order. Out-of-range indices
/// are skipped. CSV output keeps the original header row; decklist output
/// restores the foil marker.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] if the CSV writer fails.
pub fn export_failed_rows(
    parsed: &ParsedFile,
    failed_indices: &[usize],
) -> Result<String, ImportError> {
    let indices: BTreeSet<usize> = failed_indices
        .iter()
        .copied()
        .filter(|&i| i < parsed.rows.len())
        .collect();

    match parsed.format {
        InputFormat::Decklist => Ok(export_decklist(parsed, &indices)),
        InputFormat::Csv => export_csv(parsed, &indices),
    }
}

fn export_decklist(parsed: &ParsedFile, indices: &BTreeSet<usize>) -> String {
    let mut out = String::new();
    for (&i, row) in indices.iter().filter_map(|i| parsed.rows.get(*i).map(|r| (i, r))) {
        let cell = |n: usize| row.get(n).map_or("", String::as_str);
        out.push_str(&format!("{} {} ({}) {}", cell(0), cell(1), cell(2), cell(3)));
        if parsed.foil.get(i).copied().unwrap_or(false) {
            out.push_str(" *F*");
        }
        out.push('\n');
    }
    out
}

fn export_csv(parsed: &ParsedFile, indices: &BTreeSet<usize>) -> Result<String, ImportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(&parsed.headers)?;
    for row in indices.iter().filter_map(|&i| parsed.rows.get(i)) {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download name for the failed-rows file: `failed_<original name>`.
#[must_use]
pub fn failed_rows_file_name(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .map_or_else(|| original.to_string(), |n| n.to_string_lossy().into_owned());
    format!("failed_{name}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::import::parse_file;

    #[test]
    fn test_csv_export_keeps_header_and_order() {
        let parsed = parse_file("cards.csv", "name,set\nBolt,m11\nRing,c21\n\"Fire, Ice\",apc\n").unwrap();
        let out = export_failed_rows(&parsed, &[2, 0, 2, 99]).unwrap();
        assert_eq!(out, "name,set\nBolt,m11\n\"Fire, Ice\",apc\n");
    }

    #[test]
    fn test_decklist_export_restores_foil_marker() {
        let text = "4 Lightning Bolt (M11) 149\n1 Sol Ring (C21) 263 *F*\n";
        let parsed = parse_file("deck.txt", text).unwrap();
        let out = export_failed_rows(&parsed, &[1]).unwrap();
        assert_eq!(out, "1 Sol Ring (C21) 263 *F*\n");
    }

    #[test]
    fn test_export_reparses_to_failed_rows() {
        let mut text = String::from("name,qty\n");
        for i in 0..120 {
            text.push_str(&format!("card {i},1\n"));
        }
        let parsed = parse_file("big.csv", &text).unwrap();
        let failed = [53, 60, 99];
        let out = export_failed_rows(&parsed, &failed).unwrap();

        let reparsed = parse_file("failed_big.csv", &out).unwrap();
        assert_eq!(reparsed.headers, parsed.headers);
        let expected: Vec<_> = failed.iter().map(|&i| parsed.rows[i].clone()).collect();
        assert_eq!(reparsed.rows, expected);
    }

    #[test]
    fn test_failed_rows_file_name() {
        assert_eq!(failed_rows_file_name("collection.csv"), "failed_collection.csv");
        assert_eq!(failed_rows_file_name("/tmp/deck.txt"), "failed_deck.txt");
    }
}
