//! Cosine similarity.

/// Returns `dot(a, b) / (|a| · |b|)`.
///
/// Undefined (returns `None`) when either vector has zero norm, when the
/// dimensions differ, or when either vector is empty.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let similarity = dot / (norm_a * norm_b);
    similarity.is_finite().then_some(similarity)
}
