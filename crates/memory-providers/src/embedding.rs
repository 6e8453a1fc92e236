// crates/memory-providers/src/embedding.rs
//! `EmbeddingProvider`: `embed(text) -> Vec<f32>` of a fixed dimension.
//! `LocalEmbeddingProvider` is a deterministic feature-hashing embedder —
//! the same "hash-based fallback" idea documented in `zircote-rlm-rs`'s
//! Cargo.toml for when no ONNX model is loaded. Concrete model-loading is
//! out of scope (spec §1); this is the only embedder this port ships.

pub const DEFAULT_DIMENSION: usize = 384;

pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
    fn dimension(&self) -> usize;
}

pub struct LocalEmbeddingProvider {
    dimension: usize,
}

impl LocalEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for LocalEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    /// Hashes whitespace tokens (and their bigrams) into fixed-size
    /// buckets, signed by a keyed blake3 hash per bucket so collisions
    /// partially cancel instead of all adding constructively.
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vector;
        }

        let mut features: Vec<String> = tokens.clone();
        for window in tokens.windows(2) {
            features.push(format!("{} {}", window[0], window[1]));
        }

        for feature in &features {
            let hash = blake3::hash(feature.as_bytes());
            let bytes = hash.as_bytes();
            let bucket = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize % self.dimension;
            let sign = if bytes[4] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_is_deterministic() {
        let provider = LocalEmbeddingProvider::default();
        let a = provider.embed("read src/index.ts and fix bug");
        let b = provider.embed("read src/index.ts and fix bug");
        assert_eq!(a, b);
    }

    #[test]
    fn embed_has_configured_dimension() {
        let provider = LocalEmbeddingProvider::new(128);
        assert_eq!(provider.embed("hello world").len(), 128);
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let provider = LocalEmbeddingProvider::default();
        let vec = provider.embed("");
        assert!(vec.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn distinct_texts_yield_distinct_vectors() {
        let provider = LocalEmbeddingProvider::default();
        assert_ne!(provider.embed("alpha beta"), provider.embed("gamma delta"));
    }
}
