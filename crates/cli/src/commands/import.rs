//! Bulk import command.
//!
//! # Usage
//!
//! ```bash
//! # Import a collection export
//! mv-cli import cards.csv
//!
//! # Point fields at non-standard headers
//! mv-cli import export.csv --map name="Card Title" --map set=Edition
//!
//! # Continue after a failure at chunk 3 without re-sending chunks 1-2
//! mv-cli import cards.csv --resume-from 3
//! ```
//!
//! Rows the server rejects are written next to the input as
//! `failed_<file name>`, in the input's format, so they can be fixed and
//! imported again.

use std::path::{Path, PathBuf};

use manavault_core::ImportType;
use manavault_core::import::{
    ColumnMapping, ImportBatchResult, ImportError, ImportField, ImportStage, ImportWizard,
    ParsedFile,
};
use manavault_storefront::{BulkImporter, ImportSettings, StorefrontConfig};

use super::{CommandError, connect};

/// Number of server error messages logged after an import.
const MAX_REPORTED_ERRORS: usize = 10;

/// Flags of the `import` command.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub import_type: ImportType,
    /// `field=Header` overrides.
    pub mappings: Vec<String>,
    pub dry_run: bool,
    pub failed_out: Option<PathBuf>,
    /// 1-based chunk to start at.
    pub resume_from: Option<usize>,
}

/// Parse `file` and import it.
pub async fn run(file: &Path, options: ImportOptions) -> Result<(), CommandError> {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CommandError::Io {
            path: file.display().to_string(),
            source,
        })?;
    let file_name = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());

    let mut wizard = ImportWizard::new();
    wizard.load_file(&file_name, &text)?;
    let parsed = wizard
        .parsed()
        .ok_or_else(|| CommandError::InvalidArgument("file was not loaded".to_owned()))?;
    log_parsed(parsed);

    let mapping = apply_overrides(parsed.initial_mapping(), &options.mappings)?;
    for (field, header) in mapping.unknown_headers(&parsed.headers) {
        tracing::warn!(%field, header, "Mapped header not found in file");
    }
    tracing::info!(?mapping, "Column mapping");
    wizard.set_mapping(mapping)?;

    if options.dry_run {
        let settings = dry_run_settings();
        let plan = wizard.begin_submit(settings.chunk_size)?;
        for chunk in &plan.chunks {
            tracing::info!(
                chunk = chunk.number(),
                first_row = chunk.start,
                rows = chunk.len,
                "Planned chunk"
            );
        }
        tracing::info!(
            total_chunks = plan.chunks.len(),
            chunk_delay_ms = settings.chunk_delay.as_millis(),
            "Dry run, nothing sent"
        );
        return Ok(());
    }

    let (config, client) = connect()?;
    let plan = wizard.begin_submit(config.import.chunk_size)?;
    let start_chunk = start_chunk(options.resume_from, plan.chunks.len())?;
    if start_chunk > 0 {
        tracing::info!(
            skipped_chunks = start_chunk,
            "Resuming import; counts cover only the chunks sent now"
        );
    }

    let importer = BulkImporter::new(client, config.import);
    let outcome = importer
        .run_from(
            &plan,
            options.import_type,
            start_chunk,
            ImportBatchResult::new(plan.records.len()),
            |progress| {
                tracing::info!(
                    "Chunk {}/{} done ({}%), {} of {} rows imported",
                    progress.current_chunk,
                    progress.total_chunks,
                    progress.percent(),
                    progress.imported,
                    progress.total_rows
                );
            },
        )
        .await;

    match outcome {
        Ok(result) => wizard.complete(result)?,
        Err(e) => {
            if let ImportError::ChunkFailed {
                chunk, partial, ..
            } = &e
            {
                tracing::warn!(
                    imported = partial.imported_count,
                    "Stopped early; rerun with --resume-from {chunk} to continue"
                );
            }
            wizard.fail(e.to_string())?;
            return Err(e.into());
        }
    }

    if let ImportStage::Success {
        result,
        failed_export,
        ..
    } = wizard.stage()
    {
        report(result);
        if let Some((export_name, contents)) = failed_export {
            let path = failed_rows_path(file, options.failed_out.as_deref(), export_name);
            tokio::fs::write(&path, contents)
                .await
                .map_err(|source| CommandError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            tracing::warn!(
                path = %path.display(),
                rows = result.failed_indices.len(),
                "Failed rows written"
            );
        }
    }
    Ok(())
}

fn log_parsed(parsed: &ParsedFile) {
    tracing::info!(
        file = parsed.file_name,
        format = %parsed.format,
        rows = parsed.len(),
        auto_mapped = parsed.is_auto_mapped,
        "Parsed file"
    );
    tracing::debug!(headers = ?parsed.headers, "Headers");
}

fn report(result: &ImportBatchResult) {
    tracing::info!(
        imported = result.imported_count,
        total_rows = result.total_rows,
        failed = result.failed_indices.len(),
        "Import complete"
    );
    for message in result.errors.iter().take(MAX_REPORTED_ERRORS) {
        tracing::warn!("{message}");
    }
    if result.errors.len() > MAX_REPORTED_ERRORS {
        tracing::warn!(
            "... and {} more errors",
            result.errors.len() - MAX_REPORTED_ERRORS
        );
    }
}

/// Chunk settings for a dry run. The API credentials are not needed, so a
/// missing or invalid environment only falls back to the defaults.
fn dry_run_settings() -> ImportSettings {
    match StorefrontConfig::from_env() {
        Ok(config) => config.import,
        Err(e) => {
            tracing::debug!(error = %e, "Using default import settings");
            ImportSettings::default()
        }
    }
}

/// Apply `field=Header` overrides on top of a mapping. An empty header
/// unmaps the field.
fn apply_overrides(
    mut mapping: ColumnMapping,
    overrides: &[String],
) -> Result<ColumnMapping, CommandError> {
    for entry in overrides {
        let (field, header) = entry.split_once('=').ok_or_else(|| {
            CommandError::InvalidArgument(format!("expected FIELD=HEADER, got '{entry}'"))
        })?;
        let field: ImportField = field
            .parse()
            .map_err(|e| CommandError::InvalidArgument(format!("{e}")))?;
        mapping.set(field, header.trim());
    }
    Ok(mapping)
}

/// Convert a 1-based `--resume-from` into a 0-based chunk index.
fn start_chunk(resume_from: Option<usize>, total_chunks: usize) -> Result<usize, CommandError> {
    match resume_from {
        None => Ok(0),
        Some(n) if (1..=total_chunks).contains(&n) => Ok(n - 1),
        Some(n) => Err(CommandError::InvalidArgument(format!(
            "--resume-from {n} is outside 1..={total_chunks}"
        ))),
    }
}

fn failed_rows_path(input: &Path, failed_out: Option<&Path>, export_name: &str) -> PathBuf {
    failed_out.map_or_else(|| input.with_file_name(export_name), Path::to_path_buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_sets_and_unmaps() {
        let base = ColumnMapping {
            name: "Name".to_owned(),
            price: "Price".to_owned(),
            ..ColumnMapping::default()
        };
        let mapping = apply_overrides(
            base,
            &[
                "quantity=Count".to_owned(),
                "collector-number = Number".to_owned(),
                "price=".to_owned(),
            ],
        )
        .unwrap();

        assert_eq!(mapping.get(ImportField::Quantity), Some("Count"));
        assert_eq!(mapping.get(ImportField::CollectorNumber), Some("Number"));
        assert_eq!(mapping.get(ImportField::Name), Some("Name"));
        assert_eq!(mapping.get(ImportField::Price), None);
    }

    #[test]
    fn test_apply_overrides_rejects_bad_entries() {
        let missing_eq = apply_overrides(ColumnMapping::default(), &["quantity".to_owned()]);
        assert!(matches!(missing_eq, Err(CommandError::InvalidArgument(_))));

        let unknown = apply_overrides(ColumnMapping::default(), &["rarity=Rarity".to_owned()]);
        assert!(matches!(unknown, Err(CommandError::InvalidArgument(_))));
    }

    #[test]
    fn test_start_chunk_is_one_based() {
        assert_eq!(start_chunk(None, 3).unwrap(), 0);
        assert_eq!(start_chunk(Some(1), 3).unwrap(), 0);
        assert_eq!(start_chunk(Some(3), 3).unwrap(), 2);
        assert!(start_chunk(Some(0), 3).is_err());
        assert!(start_chunk(Some(4), 3).is_err());
    }

    #[test]
    fn test_failed_rows_path_defaults_next_to_input() {
        let input = Path::new("/data/imports/cards.csv");
        assert_eq!(
            failed_rows_path(input, None, "failed_cards.csv"),
            PathBuf::from("/data/imports/failed_cards.csv")
        );
        assert_eq!(
            failed_rows_path(input, Some(Path::new("/tmp/out.csv")), "failed_cards.csv"),
            PathBuf::from("/tmp/out.csv")
        );
    }
}
