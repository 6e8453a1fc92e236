// crates/memory-core/src/hook.rs
//! Normalized hook input/output shapes per spec §6. The platform adapter
//! that maps a given host's native shape onto `HookInput` is out of scope
//! (spec §1) — this module only defines the normalized contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInput {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_response: Option<serde_json::Value>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookResponse {
    #[serde(rename = "continue")]
    pub continue_: bool,
    pub suppress_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HookResponse {
    /// The standard "continue" response every handler falls back to on any
    /// internal error, per spec §4.2 and §7.
    pub fn standard() -> Self {
        Self {
            continue_: true,
            suppress_output: true,
            additional_context: None,
            error: None,
        }
    }

    pub fn with_context(context: String) -> Self {
        Self {
            continue_: true,
            suppress_output: true,
            additional_context: Some(context),
            error: None,
        }
    }
}

/// Parse a `HookInput` from raw stdin bytes, tolerating malformed JSON per
/// spec §7 item 3: a synthesized session id and cwd-derived project.
pub fn parse_hook_input(raw: &[u8], now_ms: u64) -> HookInput {
    match serde_json::from_slice::<HookInput>(raw) {
        Ok(mut input) => {
            if input.session_id.is_empty() {
                input.session_id = format!("session_{now_ms}");
            }
            if input.cwd.is_empty() {
                input.cwd = std::env::current_dir()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| ".".to_string());
            }
            input
        }
        Err(_) => HookInput {
            session_id: format!("session_{now_ms}"),
            cwd: std::env::current_dir()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|_| ".".to_string()),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_input() {
        let raw = br#"{"sessionId":"S1","cwd":"/tmp/proj","prompt":"hi"}"#;
        let input = parse_hook_input(raw, 1000);
        assert_eq!(input.session_id, "S1");
        assert_eq!(input.cwd, "/tmp/proj");
        assert_eq!(input.prompt.as_deref(), Some("hi"));
    }

    #[test]
    fn malformed_input_synthesizes_session_id() {
        let input = parse_hook_input(b"not json at all", 4242);
        assert_eq!(input.session_id, "session_4242");
        assert!(!input.cwd.is_empty());
    }

    #[test]
    fn empty_session_id_is_synthesized() {
        let raw = br#"{"cwd":"/tmp/proj"}"#;
        let input = parse_hook_input(raw, 99);
        assert_eq!(input.session_id, "session_99");
    }

    #[test]
    fn standard_response_always_continues() {
        let resp = HookResponse::standard();
        assert!(resp.continue_);
        assert!(resp.suppress_output);
        assert!(resp.additional_context.is_none());
    }
}
