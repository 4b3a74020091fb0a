//! Read/write search export files.
//!
//! An export carries the raw request, where the offers came from, and the
//! offers themselves, so a run can be inspected or diffed later.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::SearchRun;
use crate::domain::{FareOffer, OfferSource, SearchInput};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchExport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub request: SearchInput,
    pub source: OfferSource,
    pub count: usize,
    pub results: Vec<FareOffer>,
}

impl SearchExport {
    pub fn from_run(run: &SearchRun) -> Self {
        Self {
            tool: "fares".to_string(),
            generated_at: Utc::now(),
            request: run.input.clone(),
            source: run.response.source,
            count: run.response.count,
            results: run.response.results.clone(),
        }
    }
}

pub fn write_search_json(path: &Path, run: &SearchRun) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &SearchExport::from_run(run))
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    tracing::info!(path = %path.display(), "wrote search export");
    Ok(())
}

pub fn read_search_json(path: &Path) -> Result<SearchExport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open export JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid export JSON: {e}")))
}
