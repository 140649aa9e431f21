//! Bulk import: file parsing, column mapping, chunking, and failed-row export.
//!
//! The network half (sending chunks) lives in the storefront crate. This
//! module covers everything that can be decided from the file alone, plus
//! the [`ImportWizard`] state machine that ties the steps together:
//!
//! ```text
//! Upload --load_file--> Mapping --begin_submit/complete--> Success
//!                          ^  |
//!                          +--+ fail (loading cleared, error kept)
//! ```

mod chunk;
mod export;
mod mapping;
mod parse;
mod wizard;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use chunk::{ChunkRange, chunk_ranges};
pub use export::{export_failed_rows, failed_rows_file_name};
pub use mapping::{ColumnMapping, ImportField};
pub use parse::{DECKLIST_HEADERS, InputFormat, ParsedFile, parse_file};
pub use wizard::{ImportStage, ImportWizard, SubmitPlan};

/// One unparsed line of an uploaded file, split into cells.
pub type ImportRow = Vec<String>;

/// A row keyed by source header, as sent to the import endpoint.
pub type ImportRecord = std::collections::BTreeMap<String, String>;

/// Errors from parsing, exporting, or submitting an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file has no non-empty lines.
    #[error("File is empty")]
    EmptyFile,

    /// The file parsed but produced no data rows.
    #[error("No importable rows found in {format} file")]
    NoRows {
        /// Detected input format.
        format: InputFormat,
    },

    /// The file could not be read as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A chunk was rejected; the whole import stops.
    #[error("Import failed at chunk {chunk}/{total_chunks}: {message}")]
    ChunkFailed {
        /// 1-based chunk number.
        chunk: usize,
        /// Total number of chunks in the run.
        total_chunks: usize,
        /// Error text reported by the server or transport.
        message: String,
        /// Totals of the chunks that did succeed.
        partial: Box<ImportBatchResult>,
    },

    /// A wizard action was attempted from the wrong stage.
    #[error("Cannot {action} while in the {stage} step")]
    InvalidStage {
        /// Action that was attempted.
        action: &'static str,
        /// Current stage name.
        stage: &'static str,
    },
}

/// Response body of one import chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportChunkResponse {
    #[serde(default)]
    pub imported_count: usize,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Chunk-local row indices that failed validation.
    #[serde(default)]
    pub failed_indices: Vec<usize>,
}

/// Totals accumulated across all chunks of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatchResult {
    pub imported_count: usize,
    pub total_rows: usize,
    pub errors: Vec<String>,
    /// Indices into the original, unchunked row list.
    pub failed_indices: Vec<usize>,
}

impl ImportBatchResult {
    /// Empty totals for a run over `total_rows` rows.
    #[must_use]
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    /// Fold one chunk's response into the totals.
    ///
    /// Failed indices are shifted by the chunk's starting row. Indices that
    /// fall outside the chunk are discarded.
    pub fn merge_chunk(&mut self, chunk: &ChunkRange, response: ImportChunkResponse) {
        self.imported_count += response.imported_count;
        self.errors.extend(response.errors);
        self.failed_indices.extend(
            response
                .failed_indices
                .into_iter()
                .filter(|&local| local < chunk.len)
                .map(|local| chunk.start + local),
        );
    }

    /// Whether any row failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_indices.is_empty() || !self.errors.is_empty()
    }
}

/// Progress snapshot reported after each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    /// 1-based number of the chunk just completed.
    pub current_chunk: usize,
    pub total_chunks: usize,
    /// Rows imported so far.
    pub imported: usize,
    pub total_rows: usize,
}

impl ImportProgress {
    /// Percentage of chunks completed (0-100).
    #[must_use]
    pub const fn percent(&self) -> usize {
        if self.total_chunks == 0 {
            100
        } else {
            self.current_chunk * 100 / self.total_chunks
        }
    }
}
