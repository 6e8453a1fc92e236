// crates/memory-store/src/json.rs
//! Canonical JSON-array encoding for the `TEXT`-typed list columns
//! (`facts`, `concepts`, `files_read`, `files_modified`, `tags`,
//! `decisions`, `errors`), mirroring `claude-view-db`'s
//! `files_touched TEXT NOT NULL DEFAULT '[]'` convention.

pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
