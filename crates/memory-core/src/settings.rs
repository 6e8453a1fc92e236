// crates/memory-core/src/settings.rs
//! `settings.json` — persisted configuration per spec §6. Loaded once by
//! the CLI binary and threaded through to context synthesis / provider
//! selection. Modeled after the teacher's serde-derived-struct-with-Default
//! config convention; atomic write-then-rename keeps a crash mid-write
//! from corrupting the file, matching the durability posture the rest of
//! this system assumes (SPEC_FULL.md §4.9).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    pub show_tool_guidance: bool,
    pub show_summaries: bool,
    pub show_prompts: bool,
    pub show_observations: bool,
    pub max_observations: u32,
    pub max_prompts: u32,
    pub max_summaries: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            show_tool_guidance: true,
            show_summaries: true,
            show_prompts: true,
            show_observations: true,
            max_observations: 20,
            max_prompts: 10,
            max_summaries: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Local,
    HostedA,
    HostedB,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Local
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiProviderSettings {
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub context: ContextConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<AiProviderSettings>,
}

impl Settings {
    /// Load settings from disk, falling back to defaults on a missing or
    /// malformed file — never an error surfaced to a handler (spec §7).
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "malformed settings.json, using defaults");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    /// Persist settings atomically: write to a sibling temp file, then
    /// rename over the target, so a crash mid-write never leaves a
    /// truncated `settings.json` behind.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| CoreError::MalformedSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| CoreError::io(&tmp_path, e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| CoreError::io(path, e))?;
        Ok(())
    }
}
