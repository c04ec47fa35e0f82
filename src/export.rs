// src/export.rs
use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, PrimitiveArray};
use arrow::datatypes::{DataType, Field, Schema, UInt32Type};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::batch::DistanceMatrix;
use crate::error::{EditDistanceError, Result};

const ARROW_BATCH_SIZE: usize = 1 << 16;

pub fn distance_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("row", DataType::UInt32, false),
        Field::new("col", DataType::UInt32, false),
        Field::new("distance", DataType::Float32, false),
    ]))
}

struct CellBatch {
    row: Vec<u32>,
    col: Vec<u32>,
    distance: Vec<f32>,
}

impl CellBatch {
    fn new() -> Self {
        CellBatch {
            row: Vec::with_capacity(ARROW_BATCH_SIZE),
            col: Vec::with_capacity(ARROW_BATCH_SIZE),
            distance: Vec::with_capacity(ARROW_BATCH_SIZE),
        }
    }
    fn add(&mut self, i: u32, j: u32, d: f32) {
        self.row.push(i);
        self.col.push(j);
        self.distance.push(d);
    }
    fn is_full(&self) -> bool { self.row.len() >= ARROW_BATCH_SIZE }
    fn is_empty(&self) -> bool { self.row.is_empty() }
    fn take_record_batch(&mut self, schema: &Arc<Schema>) -> Result<RecordBatch> {
        let col_row: ArrayRef = Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.row)));
        let col_col: ArrayRef = Arc::new(PrimitiveArray::<UInt32Type>::from(std::mem::take(&mut self.col)));
        let col_distance: ArrayRef = Arc::new(Float32Array::from(std::mem::take(&mut self.distance)));
        Ok(RecordBatch::try_new(schema.clone(), vec![col_row, col_col, col_distance])?)
    }
}

fn index_u32(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| EditDistanceError::Shape(format!("index {} does not fit the u32 row/col columns", index)))
}

/// Writes every cell of `matrix` as `(row, col, distance)` records in the Arrow IPC file format.
/// Returns the writer once the file footer is written.
pub fn write_ipc<W: Write>(matrix: &DistanceMatrix, writer: W) -> Result<W> {
    let schema = distance_schema();
    let mut arrow_writer = FileWriter::try_new(writer, &schema)?;
    let (nx, _) = matrix.shape();
    let mut current = CellBatch::new();
    for i in 0..nx {
        let i_u32 = index_u32(i)?;
        for (j, &d) in matrix.row(i).iter().enumerate() {
            current.add(i_u32, index_u32(j)?, d);
            if current.is_full() {
                arrow_writer.write(&current.take_record_batch(&schema)?)?;
            }
        }
    }
    if !current.is_empty() {
        arrow_writer.write(&current.take_record_batch(&schema)?)?;
    }
    arrow_writer.finish()?;
    Ok(arrow_writer.into_inner()?)
}

#[derive(Serialize)]
struct MatrixJson<'a> {
    nx: usize,
    ny: usize,
    rows: Vec<&'a [f32]>,
}

/// JSON object `{"nx", "ny", "rows": [[...], ...]}`.
pub fn to_json(matrix: &DistanceMatrix) -> Result<String> {
    let (nx, ny) = matrix.shape();
    let rows = (0..nx).map(|i| matrix.row(i)).collect();
    Ok(serde_json::to_string(&MatrixJson { nx, ny, rows })?)
}
