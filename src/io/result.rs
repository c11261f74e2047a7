//! Read/write result JSON files.
//!
//! A result file is the portable record of one `an fit` run:
//! - tool name + generation timestamp
//! - the full `AnOutput` (best scenario, parameters, table, comparison list)
//!
//! `an plot --result` re-renders from it without refitting.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AnOutput;
use crate::error::AppError;

pub const TOOL_NAME: &str = "an";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub output: AnOutput,
}

impl ResultFile {
    pub fn new(output: AnOutput) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc::now(),
            output,
        }
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, output: &AnOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ResultFile::new(output.clone()))
        .map_err(|e| AppError::io(format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open result JSON '{}': {e}", path.display())))?;
    let result: ResultFile = serde_json::from_reader(file)
        .map_err(|e| AppError::io(format!("Invalid result JSON: {e}")))?;
    Ok(result)
}
