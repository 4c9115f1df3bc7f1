//! Read/write the generated store as JSON.
//!
//! The store file is the portable result of a run: run metadata plus every
//! generated series, keyed by super node and sub node. `gsgen plot` reads it
//! back to chart a super node without regenerating.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Configuration, GeneratedStore, NodeType, SuperNodeId};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub n_cycles: usize,
    pub noise: f64,
    pub node_types: BTreeMap<SuperNodeId, NodeType>,
    pub series: GeneratedStore,
}

impl StoreFile {
    pub fn new(config: &Configuration, store: &GeneratedStore, seed: u64, noise: f64) -> Self {
        Self {
            tool: "gsgen".to_string(),
            generated_at: Utc::now(),
            seed,
            n_cycles: config.n_cycles,
            noise,
            node_types: config
                .supernodes
                .iter()
                .map(|(&id, node)| (id, node.node_type))
                .collect(),
            series: store.clone(),
        }
    }
}

/// Write a store JSON file.
pub fn write_store_json(path: &Path, file: &StoreFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create store JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write store JSON: {e}")))?;
    Ok(())
}

/// Read a store JSON file.
pub fn read_store_json(path: &Path) -> Result<StoreFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open store JSON '{}': {e}", path.display())))?;
    let store: StoreFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid store JSON: {e}")))?;
    Ok(store)
}
