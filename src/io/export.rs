//! Export per-sub-node frames to CSV.
//!
//! One file per sub node, `subnode_{super}_{sub}.csv`:
//!
//! ```text
//! index,in0_0,in0_1,base
//! 0,0.12,3.40,1.87
//! ```
//!
//! Input columns hold the raw referenced series; `base` is the final combined series.

use std::path::{Path, PathBuf};

use crate::domain::SubNodeFrame;
use crate::error::AppError;

/// Write one CSV per frame into `dir` (created if missing). Returns the written paths.
pub fn write_frames_csv(dir: &Path, frames: &[SubNodeFrame]) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create output directory '{}': {e}", dir.display()))
    })?;

    let mut written = Vec::with_capacity(frames.len());
    for frame in frames {
        let path = dir.join(frame.file_name());
        write_frame_csv(&path, frame)?;
        written.push(path);
    }
    Ok(written)
}

/// Write a single frame to `path`.
pub fn write_frame_csv(path: &Path, frame: &SubNodeFrame) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["index".to_string()];
    header.extend(frame.columns.iter().map(|c| c.name.clone()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in 0..frame.n_rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.to_string());
        for column in &frame.columns {
            record.push(column.values.get(row).map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}
