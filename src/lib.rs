//! Normalized edit distance between integer unit sequences.
//!
//! Sequences are compared after collapsing runs of repeated tokens; the raw
//! Levenshtein distance is divided by the longer collapsed length. Besides the
//! single-pair [`edit_distance`], [`batch_edit_distance`] fills an all-pairs
//! matrix across a rayon pool, optionally computing only one triangle when
//! both batches are the same collection.

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod levenshtein;
pub mod pool;
pub mod reduce;
pub mod token_reader;

use wasm_bindgen::prelude::*;

pub use batch::{batch_edit_distance, batch_edit_distance_with, DistanceMatrix, PaddedBatch};
pub use config::BatchOptions;
pub use error::{EditDistanceError, Result};
pub use levenshtein::{edit_distance, levenshtein_distance};
pub use reduce::remove_consecutive_duplicates;

fn lengths_from_i64(lengths: &[i64]) -> Result<Vec<usize>> {
    lengths
        .iter()
        .map(|&len| {
            usize::try_from(len).map_err(|_| EditDistanceError::Shape(format!("negative sequence length {}", len)))
        })
        .collect()
}

fn batch_from_buffers(x: &[i64], y: &[i64], sx: &[i64], sy: &[i64], symmetric: bool) -> Result<DistanceMatrix> {
    let lengths_x = lengths_from_i64(sx)?;
    let lengths_y = lengths_from_i64(sy)?;
    let max_len_x = if lengths_x.is_empty() { 0 } else { x.len() / lengths_x.len() };
    let max_len_y = if lengths_y.is_empty() { 0 } else { y.len() / lengths_y.len() };
    let bx = PaddedBatch::new(x, max_len_x, &lengths_x)?;
    let by = PaddedBatch::new(y, max_len_y, &lengths_y)?;
    batch_edit_distance(&bx, &by, symmetric)
}

#[wasm_bindgen(js_name = editDistance)]
pub fn wasm_edit_distance(a: &[i64], b: &[i64]) -> std::result::Result<f32, JsValue> {
    edit_distance(a, b).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Row-major `(nx, ny)` distances. `x` and `y` are row-major padded buffers whose
/// width is their length divided by the number of declared lengths.
#[wasm_bindgen(js_name = editDistanceBatch)]
pub fn wasm_edit_distance_batch(
    x: &[i64], y: &[i64], lengths_x: &[i64], lengths_y: &[i64], symmetric: bool,
    progress_callback: Option<js_sys::Function>,
) -> std::result::Result<Vec<f32>, JsValue> {
    let report = |msg: &str| {
        if let Some(callback) = &progress_callback {
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(msg));
        }
    };
    report(&format!(
        "Rust Wasm: {} x {} edit distances (symmetric: {})...",
        lengths_x.len(), lengths_y.len(), symmetric
    ));
    let matrix = batch_from_buffers(x, y, lengths_x, lengths_y, symmetric)
        .map_err(|e| JsValue::from_str(&format!("Edit distance batch error: {}", e)))?;
    report("Rust Wasm: Batch complete.");
    Ok(matrix.into_vec())
}
