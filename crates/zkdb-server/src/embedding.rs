//! Text embeddings.
//!
//! The database treats an embedding model as an opaque text → vector
//! producer. [`HashingEmbedder`] is a deterministic, model-free stand-in: it
//! hashes tokens into a fixed number of signed buckets and L2-normalises the
//! result, so texts sharing words have a positive cosine similarity.

use sha2::{Digest, Sha256};

/// Produces a vector for a piece of text.
pub trait Embedder: Send + Sync {
    /// Returns the length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embeds `text`.
    fn embed(&self, text: &str) -> Vec<f64>;
}

/// Feature-hashing embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Creates an embedder producing vectors of length `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension];
        if self.dimension == 0 {
            return vector;
        }

        for token in tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_be_bytes(head) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}
