//! Export a state table to CSV.
//!
//! One row per simulated cycle; columns follow `StateTable` field order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::StateTable;
use crate::error::AppError;

pub const TABLE_HEADER: [&str; 9] = [
    "cycle",
    "growth_thickness",
    "nongrowth_thickness",
    "selectivity",
    "coverage",
    "coverage_selectivity",
    "nucleation_density",
    "thickness_delta",
    "particle_radius",
];

/// Write the table to a CSV file.
pub fn write_table_csv(path: &Path, table: &StateTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create table CSV '{}': {e}", path.display())))?;
    write_table(file, table)
}

/// Write the table to any writer.
pub fn write_table<W: Write>(writer: W, table: &StateTable) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(TABLE_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write table CSV header: {e}")))?;

    for t in 0..table.len() {
        let row = [
            table.cycle[t],
            table.growth_thickness[t],
            table.nongrowth_thickness[t],
            table.selectivity[t],
            table.coverage[t],
            table.coverage_selectivity[t],
            table.nucleation_density[t],
            table.thickness_delta[t],
            table.particle_radius[t],
        ];
        out.write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| AppError::io(format!("Failed to write table CSV row {t}: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush table CSV: {e}")))?;
    Ok(())
}
