use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use tracing::info;

use crate::batch::PaddedBatch;
use crate::error::{EditDistanceError, Result};

/// An owned batch of token sequences, padded with zeros to the longest one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenBatch {
    pub data: Vec<i64>,
    pub max_len: usize,
    pub lengths: Vec<usize>,
}

impl TokenBatch {
    pub fn from_sequences(sequences: &[Vec<i64>]) -> Self {
        let max_len = sequences.iter().map(Vec::len).max().unwrap_or(0);
        let mut data = Vec::with_capacity(sequences.len() * max_len);
        for seq in sequences {
            data.extend_from_slice(seq);
            data.resize(data.len() + max_len - seq.len(), 0);
        }
        TokenBatch { data, max_len, lengths: sequences.iter().map(Vec::len).collect() }
    }

    pub fn as_padded(&self) -> Result<PaddedBatch<'_, i64>> {
        PaddedBatch::new(&self.data, self.max_len, &self.lengths)
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Parses one sequence per line, tokens separated by whitespace.
/// A blank line is an empty sequence. Tokens must be non-negative integers.
pub fn parse_sequences<R: BufRead>(reader: R) -> Result<Vec<Vec<i64>>> {
    let mut sequences = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let mut seq = Vec::new();
        for field in line.split_whitespace() {
            let token: i64 = field.parse().map_err(|e| {
                EditDistanceError::Parse(format!("line {}: bad token '{}': {}", line_no + 1, field, e))
            })?;
            if token < 0 {
                return Err(EditDistanceError::Parse(format!(
                    "line {}: negative token {}",
                    line_no + 1, token
                )));
            }
            seq.push(token);
        }
        sequences.push(seq);
    }
    Ok(sequences)
}

/// Loads a token batch from `path`, gunzipping when the path ends with `.gz`.
pub fn load_token_batch(path: &str) -> Result<TokenBatch> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.ends_with(".gz") {
        info!("Detected .gz extension for '{}', reading as gzipped token file.", path);
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let sequences = parse_sequences(BufReader::new(reader))?;
    info!("Loaded {} sequences from '{}'.", sequences.len(), path);
    Ok(TokenBatch::from_sequences(&sequences))
}
