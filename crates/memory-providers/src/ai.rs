// crates/memory-providers/src/ai.rs
//! `AiProvider`: `run(user_prompt, system_prompt, timeout_ms) -> Option<String>`,
//! mirroring `claude-view-core::llm::LlmProvider` 1:1 in shape but sync,
//! since the whole binary is sync (SPEC_FULL.md §4.1/§4.6).

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// An AI provider MUST return `None` on any failure — unavailable, timeout,
/// bad exit status, empty output (spec §4.6).
pub trait AiProvider: Send + Sync {
    fn run(&self, user_prompt: &str, system_prompt: &str, timeout_ms: u64) -> Option<String>;
    fn is_available(&self) -> bool;
    fn name(&self) -> &str;
}

/// Env vars stripped before spawning, so a nested enrichment call launched
/// from inside a live coding-assistant session doesn't trip nested-session
/// detection in the spawned CLI (mirrors `claude_cli::stream_completion`'s
/// stripping trick).
const STRIPPED_VAR_PREFIXES: &[&str] = &["CLAUDE"];

fn stripped_env_vars() -> Vec<String> {
    std::env::vars()
        .filter(|(k, _)| STRIPPED_VAR_PREFIXES.iter().any(|p| k.starts_with(p)))
        .map(|(k, _)| k)
        .collect()
}

/// Spawns a local chat CLI binary in `-p` (print) mode. The prompt passed
/// to the process is `system_prompt` and `user_prompt` joined, since most
/// CLI chat tools take a single combined prompt argument.
pub struct LocalCliProvider {
    binary: String,
    model: Option<String>,
}

impl LocalCliProvider {
    pub fn new(binary: impl Into<String>, model: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            model,
        }
    }
}

impl Default for LocalCliProvider {
    fn default() -> Self {
        Self::new("claude", None)
    }
}

impl AiProvider for LocalCliProvider {
    fn run(&self, user_prompt: &str, system_prompt: &str, timeout_ms: u64) -> Option<String> {
        let combined = if system_prompt.is_empty() {
            user_prompt.to_string()
        } else {
            format!("{system_prompt}\n\n{user_prompt}")
        };

        let mut cmd = Command::new(&self.binary);
        cmd.args(["-p", "--output-format", "text"]);
        if let Some(model) = &self.model {
            cmd.args(["--model", model]);
        }
        cmd.arg(&combined)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        for var in stripped_env_vars() {
            cmd.env_remove(var);
        }

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, binary = %self.binary, "failed to spawn local AI provider");
                return None;
            }
        };

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        return None;
                    }
                    let mut stdout = String::new();
                    if let Some(mut out) = child.stdout.take() {
                        let _ = out.read_to_string(&mut stdout);
                    }
                    let trimmed = stdout.trim();
                    return if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::warn!(binary = %self.binary, timeout_ms, "local AI provider timed out");
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
                Err(_) => return None,
            }
        }
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "local-cli"
    }
}

/// HTTPS provider for a hosted model endpoint.
pub struct HostedApiProvider {
    base_url: String,
    api_key: String,
    model: Option<String>,
    client: reqwest::blocking::Client,
}

impl HostedApiProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model,
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[derive(serde::Serialize)]
struct HostedRequest<'a> {
    system: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct HostedResponse {
    text: String,
}

impl AiProvider for HostedApiProvider {
    fn run(&self, user_prompt: &str, system_prompt: &str, timeout_ms: u64) -> Option<String> {
        let body = HostedRequest {
            system: system_prompt,
            prompt: user_prompt,
            model: self.model.as_deref(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&body)
            .send()
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let parsed: HostedResponse = response.json().ok()?;
        let trimmed = parsed.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn is_available(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    fn name(&self) -> &str {
        "hosted-api"
    }
}

/// `MEMORY_AI={true|1|false|0}` force-overrides provider availability
/// independent of the underlying check (spec §4.6).
pub fn memory_ai_override() -> Option<bool> {
    match std::env::var("MEMORY_AI").ok()?.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn provider_enabled(provider: &dyn AiProvider) -> bool {
    match memory_ai_override() {
        Some(forced) => forced,
        None => provider.is_available(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_ai_override_parses_known_values() {
        std::env::set_var("MEMORY_AI", "false");
        assert_eq!(memory_ai_override(), Some(false));
        std::env::set_var("MEMORY_AI", "1");
        assert_eq!(memory_ai_override(), Some(true));
        std::env::remove_var("MEMORY_AI");
        assert_eq!(memory_ai_override(), None);
    }

    #[test]
    fn unavailable_local_binary_reports_unavailable() {
        let provider = LocalCliProvider::new("definitely-not-a-real-binary-xyz", None);
        assert!(!provider.is_available());
    }
}
