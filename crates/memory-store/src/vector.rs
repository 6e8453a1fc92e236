// crates/memory-store/src/vector.rs
//! Embedding BLOB codec and the `sqlite-vec` loadable-extension registration
//! with a brute-force cosine-similarity fallback, per spec §4.1/§6.

use rusqlite::Connection;

/// Encode a dense embedding as raw little-endian f32 bytes (spec §6).
pub fn encode_embedding(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB column back into a dense embedding.
pub fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two equal-length dense vectors. Returns 0.0
/// for a zero-norm vector rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Register the `sqlite-vec` loadable extension process-wide before any
/// connection is opened. Must be called at most once per process; safe to
/// call repeatedly (the underlying `sqlite3_auto_extension` call is
/// idempotent for the same function pointer).
pub fn register_vec_extension() {
    unsafe {
        match rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite_vec::sqlite3_vec_init as *const (),
        ))) {
            rusqlite::ffi::SQLITE_OK => {}
            code => {
                tracing::warn!(code, "failed to register sqlite-vec extension, falling back to brute-force cosine");
            }
        }
    }
}

/// Whether the `vec0` module is usable on this connection (extension
/// registered and compiled in).
pub fn vector_index_available(conn: &Connection) -> bool {
    conn.execute_batch("CREATE VIRTUAL TABLE IF NOT EXISTS __vec_probe USING vec0(embedding float[1])")
        .and_then(|_| conn.execute_batch("DROP TABLE IF EXISTS __vec_probe"))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_round_trips_through_blob_encoding() {
        let vec = vec![0.5f32, -1.25, 3.0, 0.0];
        let bytes = encode_embedding(&vec);
        assert_eq!(bytes.len(), 16);
        assert_eq!(decode_embedding(&bytes), vec);
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![1.0f32, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cosine_similarity_handles_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-5);
    }
}
