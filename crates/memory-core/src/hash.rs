// crates/memory-core/src/hash.rs
//! Stable content hashes for dedup, per spec §4.3: "a short
//! cryptographic-quality digest over a canonicalization of the entity's
//! defining fields."

/// Truncated hex-encoded blake3 digest, stable across runs and platforms.
pub fn content_hash(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        // 0x1e (record separator) keeps "a"+"bc" distinct from "ab"+"c".
        hasher.update(&[0x1e]);
    }
    let digest = hasher.finalize();
    hex::encode(&digest.as_bytes()[..8])
}

/// `session_id || tool_name || canonical(tool_input)` per spec §4.3.
pub fn observation_hash(session_id: &str, tool_name: &str, canonical_input: &str) -> String {
    content_hash(&[session_id, tool_name, canonical_input])
}

/// `project || prompt_text` per spec §4.3.
pub fn prompt_hash(project: &str, prompt_text: &str) -> String {
    content_hash(&[project, prompt_text])
}

/// `namespace || key || content` per spec §4.3.
pub fn memory_entry_hash(namespace: &str, key: &str, content: &str) -> String {
    content_hash(&[namespace, key, content])
}

/// Generate an observation id: `obs_<epoch_ms>_<4 random chars>` per spec §3.
pub fn generate_observation_id(now_ms: u64) -> String {
    use rand::Rng;
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("obs_{now_ms}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = observation_hash("s1", "Read", "{\"file_path\":\"x\"}");
        let b = observation_hash("s1", "Read", "{\"file_path\":\"x\"}");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_distinguishes_field_boundaries() {
        let a = content_hash(&["a", "bc"]);
        let b = content_hash(&["ab", "c"]);
        assert_ne!(a, b);
    }

    #[test]
    fn observation_id_has_expected_shape() {
        let id = generate_observation_id(12345);
        assert!(id.starts_with("obs_12345_"));
        assert_eq!(id.len(), "obs_12345_".len() + 4);
    }
}
