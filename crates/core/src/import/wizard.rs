//! The three-step import flow: upload, map columns, show results.

use std::num::NonZeroUsize;

use super::{
    ChunkRange, ColumnMapping, ImportBatchResult, ImportError, ImportRecord, ParsedFile,
    chunk_ranges, export_failed_rows, failed_rows_file_name, parse_file,
};

/// Current step of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImportStage {
    /// Waiting for a file.
    #[default]
    Upload,
    /// File parsed; the user reviews or edits the column mapping.
    Mapping {
        parsed: ParsedFile,
        mapping: ColumnMapping,
        /// A submission is in flight.
        loading: bool,
        /// Message from the last failed submission.
        last_error: Option<String>,
    },
    /// Submission finished.
    Success {
        parsed: ParsedFile,
        result: ImportBatchResult,
        /// `(file name, contents)` of the failed rows, when there are any.
        failed_export: Option<(String, String)>,
    },
}

impl ImportStage {
    /// Short name used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Mapping { .. } => "mapping",
            Self::Success { .. } => "success",
        }
    }
}

/// Everything the network layer needs to send an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPlan {
    pub records: Vec<ImportRecord>,
    pub mapping: ColumnMapping,
    pub chunks: Vec<ChunkRange>,
}

/// Drives an import through its stages.
#[derive(Debug, Clone, Default)]
pub struct ImportWizard {
    stage: ImportStage,
}

impl ImportWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn stage(&self) -> &ImportStage {
        &self.stage
    }

    /// Parse a file and move to the mapping step.
    ///
    /// On error the wizard stays where it was.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidStage`] unless at the upload step, or
    /// any error from [`parse_file`].
    pub fn load_file(&mut self, file_name: &str, text: &str) -> Result<(), ImportError> {
        self.expect_stage("load a file", |s| matches!(s, ImportStage::Upload))?;
        let parsed = parse_file(file_name, text)?;
        let mapping = parsed.initial_mapping();
        self.stage = ImportStage::Mapping {
            parsed,
            mapping,
            loading: false,
            last_error: None,
        };
        Ok(())
    }

    /// The loaded file, once past the upload step.
    #[must_use]
    pub const fn parsed(&self) -> Option<&ParsedFile> {
        match &self.stage {
            ImportStage::Upload => None,
            ImportStage::Mapping { parsed, .. } | ImportStage::Success { parsed, .. } => {
                Some(parsed)
            }
        }
    }

    /// Replace the column mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidStage`] unless at the mapping step.
    pub fn set_mapping(&mut self, new_mapping: ColumnMapping) -> Result<(), ImportError> {
        let stage = self.stage.name();
        match &mut self.stage {
            ImportStage::Mapping { mapping, .. } => {
                *mapping = new_mapping;
                Ok(())
            }
            _ => Err(ImportError::InvalidStage {
                action: "change the mapping",
                stage,
            }),
        }
    }

    /// Mark a submission in flight and return what to send.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidStage`] unless at the mapping step with
    /// no submission already running.
    pub fn begin_submit(&mut self, chunk_size: NonZeroUsize) -> Result<SubmitPlan, ImportError> {
        let stage = self.stage.name();
        match &mut self.stage {
            ImportStage::Mapping {
                parsed,
                mapping,
                loading,
                last_error,
            } if !*loading => {
                *loading = true;
                *last_error = None;
                Ok(SubmitPlan {
                    records: parsed.records(),
                    mapping: mapping.clone(),
                    chunks: chunk_ranges(parsed.len(), chunk_size),
                })
            }
            ImportStage::Mapping { .. } => Err(ImportError::InvalidStage {
                action: "submit",
                stage: "submitting",
            }),
            _ => Err(ImportError::InvalidStage {
                action: "submit",
                stage,
            }),
        }
    }

    /// Finish a submission and move to the results step.
    ///
    /// When rows failed, the failed-rows export is prepared here.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidStage`] unless a submission is in
    /// flight, or a CSV error from the export.
    pub fn complete(&mut self, result: ImportBatchResult) -> Result<(), ImportError> {
        let stage = self.stage.name();
        let ImportStage::Mapping {
            parsed,
            loading: true,
            ..
        } = &self.stage
        else {
            return Err(ImportError::InvalidStage {
                action: "complete an import",
                stage,
            });
        };

        let failed_export = if result.failed_indices.is_empty() {
            None
        } else {
            let contents = export_failed_rows(parsed, &result.failed_indices)?;
            Some((failed_rows_file_name(&parsed.file_name), contents))
        };

        self.stage = ImportStage::Success {
            parsed: parsed.clone(),
            result,
            failed_export,
        };
        Ok(())
    }

    /// Record a failed submission. The wizard stays at the mapping step so
    /// the user can retry.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidStage`] unless at the mapping step.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ImportError> {
        let stage = self.stage.name();
        match &mut self.stage {
            ImportStage::Mapping {
                loading,
                last_error,
                ..
            } => {
                *loading = false;
                *last_error = Some(message.into());
                Ok(())
            }
            _ => Err(ImportError::InvalidStage {
                action: "report a failure",
                stage,
            }),
        }
    }

    /// Start over with a new file.
    pub fn reset(&mut self) {
        self.stage = ImportStage::Upload;
    }

    fn expect_stage(
        &self,
        action: &'static str,
        ok: impl Fn(&ImportStage) -> bool,
    ) -> Result<(), ImportError> {
        if ok(&self.stage) {
            Ok(())
        } else {
            Err(ImportError::InvalidStage {
                action,
                stage: self.stage.name(),
            })
        }
    }
}
