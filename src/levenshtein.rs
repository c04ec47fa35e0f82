// src/levenshtein.rs
use crate::error::{EditDistanceError, Result};
use crate::reduce::remove_consecutive_duplicates;

/// Unit-cost Levenshtein distance between two token slices.
///
/// Only the previous DP row is kept; the recurrence and the `dp[i][0] = i`,
/// `dp[0][j] = j` base cases are the full-table ones. The shorter operand is the
/// inner row so the buffers are sized by `min(len)`.
pub fn levenshtein_distance<T: PartialEq>(s1: &[T], s2: &[T]) -> usize {
    if s1.is_empty() { return s2.len(); }
    if s2.is_empty() { return s1.len(); }

    let (s1_effective, s2_effective) = if s1.len() <= s2.len() { (s1, s2) } else { (s2, s1) };

    let len1 = s1_effective.len();
    let len2 = s2_effective.len();

    let mut previous_row: Vec<usize> = (0..=len1).collect();
    let mut current_row: Vec<usize> = vec![0; len1 + 1];

    for j_idx in 1..=len2 {
        current_row[0] = j_idx;
        for i_idx in 1..=len1 {
            let cost = if s1_effective[i_idx - 1] == s2_effective[j_idx - 1] { 0 } else { 1 };
            current_row[i_idx] = std::cmp::min(
                previous_row[i_idx] + 1,
                std::cmp::min(
                    current_row[i_idx - 1] + 1,
                    previous_row[i_idx - 1] + cost,
                ),
            );
        }
        std::mem::swap(&mut previous_row, &mut current_row);
    }
    previous_row[len1]
}

/// Normalized edit distance between two non-empty sequences.
///
/// Both operands are reduced with [`remove_consecutive_duplicates`] first, and the
/// raw distance is divided by the longer reduced length. Fails with
/// [`EditDistanceError::InvalidArgument`] when either input is empty.
pub fn edit_distance<T: PartialEq + Copy>(a: &[T], b: &[T]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Err(EditDistanceError::empty_sequence());
    }
    let a_reduced = remove_consecutive_duplicates(a);
    let b_reduced = remove_consecutive_duplicates(b);

    let norm = a_reduced.len().max(b_reduced.len());
    if norm == 0 {
        return Ok(0.0);
    }
    let raw = levenshtein_distance(&a_reduced, &b_reduced);
    Ok(raw as f32 / norm as f32)
}
