// src/reduce.rs

/// Collapses every run of equal consecutive tokens to a single token, keeping order.
/// An empty input gives an empty output.
pub fn remove_consecutive_duplicates<T: PartialEq + Copy>(tokens: &[T]) -> Vec<T> {
    let mut reduced = Vec::with_capacity(tokens.len());
    for &token in tokens {
        if reduced.last() != Some(&token) {
            reduced.push(token);
        }
    }
    reduced
}

/// True when no two adjacent tokens are equal.
pub fn is_reduced<T: PartialEq>(tokens: &[T]) -> bool {
    tokens.windows(2).all(|pair| pair[0] != pair[1])
}
