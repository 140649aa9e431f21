//! Paced, sequential bulk import.
//!
//! Rows go out in fixed-size chunks, one request at a time. Between chunks
//! the [`ChunkPacer`] holds the next request until the configured delay has
//! passed since the previous chunk finished; that gap is the only
//! backpressure the import endpoint gets. The first failed chunk stops the
//! run, and [`BulkImporter::run_from`] picks it up again later without
//! re-sending what already went through.

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use manavault_core::ImportType;
use manavault_core::import::{
    ColumnMapping, ImportBatchResult, ImportChunkResponse, ImportError, ImportProgress,
    ImportRecord, SubmitPlan,
};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Rows per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(50).expect("50 is nonzero");

/// Gap after a chunk completes before the next one is sent.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(500);

/// Chunking and pacing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    pub chunk_size: NonZeroUsize,
    pub chunk_delay: Duration,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }
}

// =============================================================================
// ChunkPacer
// =============================================================================

/// Enforces a minimum gap between the end of one chunk and the start of the
/// next. The first chunk is never delayed.
#[derive(Debug)]
pub struct ChunkPacer {
    delay: Duration,
    last_completed: Option<Instant>,
}

impl ChunkPacer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_completed: None,
        }
    }

    /// Wait until the next chunk may be sent.
    pub async fn ready(&self) {
        if let Some(last) = self.last_completed {
            tokio::time::sleep_until(last + self.delay).await;
        }
    }

    /// Record that a chunk has just finished.
    pub fn completed(&mut self) {
        self.last_completed = Some(Instant::now());
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Something that accepts one import chunk.
pub trait ChunkSubmitter {
    /// Send one chunk of records.
    fn submit_chunk(
        &self,
        import_type: ImportType,
        records: &[ImportRecord],
        mapping: &ColumnMapping,
    ) -> impl Future<Output = Result<ImportChunkResponse, ApiError>> + Send;
}

impl ChunkSubmitter for ApiClient {
    fn submit_chunk(
        &self,
        import_type: ImportType,
        records: &[ImportRecord],
        mapping: &ColumnMapping,
    ) -> impl Future<Output = Result<ImportChunkResponse, ApiError>> + Send {
        self.import_chunk(import_type, records, mapping)
    }
}

/// Sends a [`SubmitPlan`] chunk by chunk.
#[derive(Debug, Clone)]
pub struct BulkImporter<S = ApiClient> {
    submitter: S,
    settings: ImportSettings,
}

impl<S: ChunkSubmitter> BulkImporter<S> {
    #[must_use]
    pub const fn new(submitter: S, settings: ImportSettings) -> Self {
        Self {
            submitter,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Import every chunk of `plan`.
    ///
    /// `on_progress` is called after each chunk that succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ChunkFailed`] for the first chunk that fails.
    /// It carries the totals of the chunks that succeeded.
    pub async fn run(
        &self,
        plan: &SubmitPlan,
        import_type: ImportType,
        on_progress: impl FnMut(ImportProgress),
    ) -> Result<ImportBatchResult, ImportError> {
        let partial = ImportBatchResult::new(plan.records.len());
        self.run_from(plan, import_type, 0, partial, on_progress)
            .await
    }

    /// Continue an import at the 0-based chunk `start_chunk`, adding to
    /// `partial`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::ChunkFailed`] for the first chunk that fails.
    #[instrument(
        skip_all,
        fields(
            import_type = %import_type,
            start_chunk = start_chunk,
            total_chunks = plan.chunks.len()
        )
    )]
    pub async fn run_from(
        &self,
        plan: &SubmitPlan,
        import_type: ImportType,
        start_chunk: usize,
        partial: ImportBatchResult,
        mut on_progress: impl FnMut(ImportProgress),
    ) -> Result<ImportBatchResult, ImportError> {
        let total_chunks = plan.chunks.len();
        let mut result = partial;
        let mut pacer = ChunkPacer::new(self.settings.chunk_delay);

        for chunk in plan.chunks.iter().skip(start_chunk) {
            pacer.ready().await;

            let records = plan.records.get(chunk.rows()).unwrap_or_default();
            info!(
                chunk = chunk.number(),
                total_chunks,
                rows = records.len(),
                "Submitting import chunk"
            );

            let response = match self
                .submitter
                .submit_chunk(import_type, records, &plan.mapping)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        chunk = chunk.number(),
                        total_chunks,
                        error = %e,
                        "Import chunk failed, stopping"
                    );
                    return Err(ImportError::ChunkFailed {
                        chunk: chunk.number(),
                        total_chunks,
                        message: e.to_string(),
                        partial: Box::new(result),
                    });
                }
            };
            pacer.completed();

            result.merge_chunk(chunk, response);
            on_progress(ImportProgress {
                current_chunk: chunk.number(),
                total_chunks,
                imported: result.imported_count,
                total_rows: result.total_rows,
            });
        }

        info!(
            imported = result.imported_count,
            failed = result.failed_indices.len(),
            total_rows = result.total_rows,
            "Import finished"
        );
        Ok(result)
    }
}
