//! Result export
//!
//! Writes the current result to a fixed file name in the export directory.
//! Content goes to a temporary file in the same directory first and is then
//! persisted over the target, so no partial artifact or stray temp file is
//! left behind.

use crate::error::ExportError;
use crate::model::result::cell_text;
use crate::model::ExtractionResult;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub const JSON_EXPORT_NAME: &str = "bakery_items.json";
pub const CSV_EXPORT_NAME: &str = "bakery_items.csv";

/// Pretty-printed JSON form of a result
///
/// Shared by the raw view and the JSON export so both show the same text.
pub fn to_json_string(result: &ExtractionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `result` as `bakery_items.json`
    ///
    /// Returns `Ok(None)` without touching the filesystem when there is no
    /// result.
    pub fn export_json(
        &self,
        result: Option<&ExtractionResult>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let Some(result) = result else {
            tracing::debug!("json export skipped, no result");
            return Ok(None);
        };

        let json = to_json_string(result)?;
        let path = self.write_atomic(JSON_EXPORT_NAME, json.as_bytes())?;
        tracing::info!(path = %path.display(), rows = result.row_count(), "exported json");
        Ok(Some(path))
    }

    /// Write `result` as `bakery_items.csv`, columns in header order
    pub fn export_csv(
        &self,
        result: Option<&ExtractionResult>,
    ) -> Result<Option<PathBuf>, ExportError> {
        let Some(result) = result else {
            tracing::debug!("csv export skipped, no result");
            return Ok(None);
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&result.header)?;
        for row in &result.data {
            writer.write_record(
                result
                    .header
                    .iter()
                    .map(|column| cell_text(row, column).into_owned()),
            )?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;

        let path = self.write_atomic(CSV_EXPORT_NAME, &bytes)?;
        tracing::info!(path = %path.display(), rows = result.row_count(), "exported csv");
        Ok(Some(path))
    }

    fn write_atomic(&self, name: &str, contents: &[u8]) -> Result<PathBuf, ExportError> {
        let target = self.dir.join(name);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;

        tmp.persist(&target).map_err(|source| ExportError::Persist {
            path: target.clone(),
            source,
        })?;

        Ok(fs::canonicalize(&target).unwrap_or(target))
    }
}
