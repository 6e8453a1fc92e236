// crates/memory-providers/src/ops.rs
//! Each enrichment operation is a `(build_prompt, parse_response)` pure
//! function pair, unit tested against fenced/unfenced/malformed JSON
//! fixtures (spec §4.6).

use serde::Deserialize;
use serde_json::Value;

use agentkits_memory_core::derive::{MAX_CONCEPTS, MAX_CONCEPT_CHARS, MAX_FACTS, MAX_FACT_CHARS};

/// Strip a single leading/trailing Markdown code fence (```` ``` ```` or
/// ```` ```json ````), tolerating trailing whitespace.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.trim_start_matches("json").trim_start();
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        trimmed
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

fn coerce_string_list(value: &Value, max_items: usize, max_chars: usize) -> Vec<String> {
    let Some(array) = value.as_array() else {
        return Vec::new();
    };
    array
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .map(|s| truncate_chars(&s, max_chars))
        .take(max_items)
        .collect()
}

/// Clamp a provider-reported confidence to `[0,1]` and multiplicatively
/// penalize short or empty required fields (spec §4.6).
fn compute_confidence(raw_confidence: f64, fields: &[&str]) -> f32 {
    let clamped = raw_confidence.clamp(0.0, 1.0) as f32;
    let penalty: f32 = fields
        .iter()
        .map(|f| {
            if f.is_empty() {
                0.3
            } else if f.len() < 10 {
                0.7
            } else {
                1.0
            }
        })
        .product();
    clamped * penalty
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichObservationResult {
    pub subtitle: String,
    pub narrative: String,
    pub facts: Vec<String>,
    pub concepts: Vec<String>,
    pub confidence: f32,
}

pub fn build_enrich_observation_prompt(tool_name: &str, tool_input: &str, tool_response: &str) -> String {
    format!(
        "You are enriching one tool-use observation for a coding-agent memory store.\n\
         Tool: {tool_name}\nInput: {tool_input}\nResponse: {tool_response}\n\n\
         Reply with ONLY a JSON object: {{\"subtitle\": string, \"narrative\": string, \
         \"facts\": string[max 5], \"concepts\": string[max 8], \"confidence\": number 0-1}}."
    )
}

#[derive(Deserialize)]
struct RawEnrichObservation {
    subtitle: Option<Value>,
    narrative: Option<Value>,
    facts: Option<Value>,
    concepts: Option<Value>,
    confidence: Option<f64>,
}

pub fn parse_enrich_observation_response(text: &str) -> Option<EnrichObservationResult> {
    let cleaned = strip_code_fences(text);
    let raw: RawEnrichObservation = serde_json::from_str(cleaned).ok()?;
    let subtitle = raw.subtitle?.as_str()?.to_string();
    let narrative = raw.narrative?.as_str()?.to_string();
    if subtitle.is_empty() || narrative.is_empty() {
        return None;
    }
    let facts = raw.facts.as_ref().map(|v| coerce_string_list(v, MAX_FACTS, MAX_FACT_CHARS)).unwrap_or_default();
    let concepts = raw
        .concepts
        .as_ref()
        .map(|v| coerce_string_list(v, MAX_CONCEPTS, MAX_CONCEPT_CHARS))
        .unwrap_or_default();
    let confidence = compute_confidence(raw.confidence.unwrap_or(0.5), &[&subtitle, &narrative]);

    Some(EnrichObservationResult {
        subtitle,
        narrative,
        facts,
        concepts,
        confidence,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressObservationResult {
    pub compressed_summary: String,
    pub confidence: f32,
}

pub fn build_compress_observation_prompt(title: &str, narrative: &str, facts: &[String]) -> String {
    format!(
        "Compress this observation into a dense summary of 50-150 characters.\n\
         Title: {title}\nNarrative: {narrative}\nFacts: {}\n\n\
         Reply with ONLY a JSON object: {{\"summary\": string, \"confidence\": number 0-1}}.",
        facts.join("; ")
    )
}

#[derive(Deserialize)]
struct RawCompressObservation {
    summary: Option<Value>,
    confidence: Option<f64>,
}

pub fn parse_compress_observation_response(text: &str) -> Option<CompressObservationResult> {
    let cleaned = strip_code_fences(text);
    let raw: RawCompressObservation = serde_json::from_str(cleaned).ok()?;
    let summary = raw.summary?.as_str()?.trim().to_string();
    if summary.is_empty() {
        return None;
    }
    let capped = truncate_chars(&summary, 150);
    let confidence = compute_confidence(raw.confidence.unwrap_or(0.5), &[&capped]);
    Some(CompressObservationResult {
        compressed_summary: capped,
        confidence,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichSummaryResult {
    pub notes: String,
    pub next_steps: String,
    pub confidence: f32,
}

/// Built from the transcript's last assistant message (spec §6 Transcript
/// file format).
pub fn build_enrich_summary_prompt(request: &str, last_assistant_message: &str) -> String {
    format!(
        "Given this user request and the assistant's final message, extract notes and next steps.\n\
         Request: {request}\nFinal message: {last_assistant_message}\n\n\
         Reply with ONLY a JSON object: {{\"notes\": string, \"nextSteps\": string, \"confidence\": number 0-1}}."
    )
}

#[derive(Deserialize)]
struct RawEnrichSummary {
    notes: Option<Value>,
    #[serde(rename = "nextSteps")]
    next_steps: Option<Value>,
    confidence: Option<f64>,
}

pub fn parse_enrich_summary_response(text: &str) -> Option<EnrichSummaryResult> {
    let cleaned = strip_code_fences(text);
    let raw: RawEnrichSummary = serde_json::from_str(cleaned).ok()?;
    let notes = raw.notes?.as_str()?.to_string();
    let next_steps = raw.next_steps?.as_str()?.to_string();
    let confidence = compute_confidence(raw.confidence.unwrap_or(0.5), &[&notes, &next_steps]);
    Some(EnrichSummaryResult {
        notes,
        next_steps,
        confidence,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateDigestResult {
    pub digest: String,
    pub confidence: f32,
}

pub fn build_generate_digest_prompt(request: &str, observation_summaries: &[String], completed: &str, files_modified: &[String]) -> String {
    format!(
        "Produce a session digest of 200-500 characters from this data.\n\
         Request: {request}\nCompleted: {completed}\nFiles modified: {}\nObservations: {}\n\n\
         Reply with ONLY a JSON object: {{\"digest\": string, \"confidence\": number 0-1}}.",
        files_modified.join(", "),
        observation_summaries.join(" | ")
    )
}

#[derive(Deserialize)]
struct RawGenerateDigest {
    digest: Option<Value>,
    confidence: Option<f64>,
}

pub fn parse_generate_digest_response(text: &str) -> Option<GenerateDigestResult> {
    let cleaned = strip_code_fences(text);
    let raw: RawGenerateDigest = serde_json::from_str(cleaned).ok()?;
    let digest = raw.digest?.as_str()?.trim().to_string();
    if digest.is_empty() {
        return None;
    }
    let capped = truncate_chars(&digest, 600);
    let confidence = compute_confidence(raw.confidence.unwrap_or(0.5), &[&capped]);
    Some(GenerateDigestResult {
        digest: capped,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"subtitle\": \"s\", \"narrative\": \"n text\", \"facts\": [\"a\"], \"concepts\": [\"b\"], \"confidence\": 0.9}\n```";
        let result = parse_enrich_observation_response(text).unwrap();
        assert_eq!(result.subtitle, "s");
        assert_eq!(result.facts, vec!["a"]);
    }

    #[test]
    fn parses_unfenced_json() {
        let text = "{\"subtitle\": \"s\", \"narrative\": \"n\", \"confidence\": 0.5}";
        assert!(parse_enrich_observation_response(text).is_some());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_enrich_observation_response("not json at all").is_none());
    }

    #[test]
    fn rejects_missing_required_field() {
        let text = "{\"subtitle\": \"s\"}";
        assert!(parse_enrich_observation_response(text).is_none());
    }

    #[test]
    fn coerces_non_string_array_elements() {
        let text = "{\"subtitle\": \"s\", \"narrative\": \"n\", \"facts\": [1, true], \"confidence\": 0.5}";
        let result = parse_enrich_observation_response(text).unwrap();
        assert_eq!(result.facts, vec!["1", "true"]);
    }

    #[test]
    fn compress_result_caps_summary_length() {
        let long = "x".repeat(500);
        let text = format!("{{\"summary\": \"{long}\", \"confidence\": 1.0}}");
        let result = parse_compress_observation_response(&text).unwrap();
        assert!(result.compressed_summary.chars().count() <= 150);
    }

    #[test]
    fn confidence_penalizes_short_fields() {
        let full = compute_confidence(1.0, &["a proper length subtitle here"]);
        let short = compute_confidence(1.0, &["x"]);
        assert!(full > short);
    }

    #[test]
    fn digest_caps_at_six_hundred_chars() {
        let long = "y".repeat(900);
        let text = format!("{{\"digest\": \"{long}\", \"confidence\": 0.8}}");
        let result = parse_generate_digest_response(&text).unwrap();
        assert!(result.digest.chars().count() <= 600);
    }
}
