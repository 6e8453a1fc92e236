// crates/memory-core/src/derive.rs
//! Template-only derivation of an observation's `type`, `title`,
//! `subtitle`, `narrative`, `facts`, and `concepts` from its raw tool
//! payload — no AI required, per spec §3/§4.3. Every function here is a
//! pure `fn(...) -> ...` that tolerates a payload being a structured
//! object, a JSON string, or absent, and never panics.

use crate::types::{Observation, ObservationType};
use serde_json::Value;

pub const MAX_FACTS: usize = 5;
pub const MAX_FACT_CHARS: usize = 200;
pub const MAX_CONCEPTS: usize = 8;
pub const MAX_CONCEPT_CHARS: usize = 50;
pub const MAX_DECISIONS: usize = 5;
pub const MAX_ERRORS: usize = 10;

/// A tool payload in one of the three shapes spec §4.3 requires decoders
/// to tolerate: absent, a bare string, or a structured JSON value.
#[derive(Debug, Clone)]
pub enum ToolPayload {
    Null,
    Text(String),
    Json(Value),
}

impl ToolPayload {
    pub fn from_json_value(v: Option<&Value>) -> Self {
        match v {
            None => ToolPayload::Null,
            Some(Value::Null) => ToolPayload::Null,
            Some(Value::String(s)) => ToolPayload::Text(s.clone()),
            Some(other) => ToolPayload::Json(other.clone()),
        }
    }

    /// Canonical stringified form used both for storage and for content
    /// hashing (spec §4.3's `canonical(tool_input)`).
    pub fn canonical_string(&self) -> String {
        match self {
            ToolPayload::Null => "null".to_string(),
            ToolPayload::Text(s) => s.clone(),
            ToolPayload::Json(v) => serde_json::to_string(v).unwrap_or_else(|_| "null".to_string()),
        }
    }

    /// Look up a named string field, tolerant of all three payload shapes.
    /// For a bare `Text` payload, `command`/`query`/`pattern` all resolve
    /// to the whole string, since many tools pass their sole argument as
    /// a raw string rather than `{field: value}`.
    pub fn field(&self, key: &str) -> Option<String> {
        match self {
            ToolPayload::Null => None,
            ToolPayload::Text(s) => match key {
                "command" | "query" | "pattern" | "url" | "file_path" => Some(s.clone()),
                _ => None,
            },
            ToolPayload::Json(v) => v.get(key).and_then(|f| match f {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        }
    }
}

fn lower_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Classify a tool name into the closed `{read, write, execute, search,
/// other}` set per spec §3.
pub fn classify_type(tool_name: &str) -> ObservationType {
    const READ_TOOLS: &[&str] = &["Read", "NotebookRead"];
    const WRITE_TOOLS: &[&str] = &["Edit", "MultiEdit", "Write", "NotebookEdit"];
    const EXECUTE_TOOLS: &[&str] = &["Bash", "BashOutput", "Task", "KillShell"];
    const SEARCH_TOOLS: &[&str] = &["Grep", "Glob", "WebSearch", "WebFetch"];

    if READ_TOOLS.contains(&tool_name) {
        return ObservationType::Read;
    }
    if WRITE_TOOLS.contains(&tool_name) {
        return ObservationType::Write;
    }
    if EXECUTE_TOOLS.contains(&tool_name) {
        return ObservationType::Execute;
    }
    if SEARCH_TOOLS.contains(&tool_name) {
        return ObservationType::Search;
    }

    // Fallback heuristic for unrecognized tool names (plugin/MCP tools).
    let lower = tool_name.to_lowercase();
    if lower.contains("read") {
        ObservationType::Read
    } else if lower.contains("write") || lower.contains("edit") {
        ObservationType::Write
    } else if lower.contains("search") || lower.contains("grep") || lower.contains("find") {
        ObservationType::Search
    } else if lower.contains("bash") || lower.contains("exec") || lower.contains("run") || lower.contains("task") {
        ObservationType::Execute
    } else {
        ObservationType::Other
    }
}

/// `(title, subtitle, narrative)` rendered from a fixed per-tool template,
/// substituting `{file_path}` / `{command}` / `{pattern}` / `{query}` /
/// `{url}` placeholders from the payload.
pub fn derive_title_subtitle_narrative(tool_name: &str, input: &ToolPayload) -> (String, String, String) {
    let file_path = input.field("file_path").unwrap_or_else(|| "(unknown file)".to_string());
    let command = input.field("command").unwrap_or_else(|| "(unknown command)".to_string());
    let pattern = input.field("pattern").unwrap_or_else(|| "(unknown pattern)".to_string());
    let query = input.field("query").unwrap_or_else(|| "(unknown query)".to_string());
    let url = input.field("url").unwrap_or_else(|| "(unknown url)".to_string());

    match tool_name {
        "Read" | "NotebookRead" => (
            format!("Read {file_path}"),
            "Viewed file contents".to_string(),
            format!("Read the contents of {file_path}."),
        ),
        "Write" => (
            format!("Write {file_path}"),
            "Created or overwrote file".to_string(),
            format!("Wrote new content to {file_path}."),
        ),
        "Edit" | "MultiEdit" | "NotebookEdit" => (
            format!("Edit {file_path}"),
            "Modified file".to_string(),
            format!("Edited {file_path}."),
        ),
        "Bash" | "BashOutput" => (
            format!("Run: {command}"),
            "Executed shell command".to_string(),
            format!("Ran command `{command}`."),
        ),
        "Grep" => (
            format!("Search for \"{pattern}\""),
            "Searched code".to_string(),
            format!("Searched for pattern `{pattern}`."),
        ),
        "Glob" => (
            format!("Find files matching {pattern}"),
            "Searched for files".to_string(),
            format!("Found files matching `{pattern}`."),
        ),
        "WebSearch" => (
            format!("Web search: {query}"),
            "Searched the web".to_string(),
            format!("Searched the web for \"{query}\"."),
        ),
        "WebFetch" => (
            format!("Fetch {url}"),
            "Fetched a web page".to_string(),
            format!("Fetched content from {url}."),
        ),
        "Task" => (
            "Run subagent task".to_string(),
            "Delegated work to a subagent".to_string(),
            "Delegated a task to a subagent.".to_string(),
        ),
        other => (
            other.to_string(),
            "Tool invocation".to_string(),
            format!("Invoked {other}."),
        ),
    }
}

/// File extension → language concept tag, per spec §4.3.
fn language_tag(file_path: &str) -> Option<&'static str> {
    let ext = file_path.rsplit('.').next()?.to_lowercase();
    Some(match ext.as_str() {
        "rs" => "lang:rust",
        "ts" | "tsx" => "lang:typescript",
        "js" | "jsx" | "mjs" | "cjs" => "lang:javascript",
        "py" => "lang:python",
        "go" => "lang:go",
        "rb" => "lang:ruby",
        "java" => "lang:java",
        "kt" | "kts" => "lang:kotlin",
        "c" | "h" => "lang:c",
        "cpp" | "cc" | "hpp" => "lang:cpp",
        "md" | "mdx" => "lang:markdown",
        "json" => "lang:json",
        "toml" => "lang:toml",
        "yaml" | "yml" => "lang:yaml",
        "sh" | "bash" => "lang:shell",
        "sql" => "lang:sql",
        "html" => "lang:html",
        "css" | "scss" => "lang:css",
        _ => return None,
    })
}

/// Extract `fn:<name>` / `class:<name>` / `pattern:<kind>` tokens from an
/// edit's before/after strings.
fn extract_code_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let fn_re = regex_lite::Regex::new(r"\b(?:fn|def|function)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    let class_re = regex_lite::Regex::new(r"\b(?:class|struct|interface)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();

    for cap in fn_re.captures_iter(text).take(4) {
        tokens.push(format!("fn:{}", &cap[1]));
    }
    for cap in class_re.captures_iter(text).take(4) {
        tokens.push(format!("class:{}", &cap[1]));
    }
    if text.contains("async ") {
        tokens.push("pattern:async".to_string());
    }
    if text.contains("trait ") || text.contains("impl ") {
        tokens.push("pattern:trait-impl".to_string());
    }
    tokens
}

/// Kind of a structured diff hunk between an edit's before/after text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Addition,
    Deletion,
    Replacement,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Addition => "addition",
            DiffKind::Deletion => "deletion",
            DiffKind::Replacement => "replacement",
        }
    }
}

/// Classify and render one `[DIFF <file> <kind>]` fact for an edit tool,
/// with an optional plain single-line `modification` clause when both
/// sides are non-empty and differ only lightly. Uses `similar`'s line
/// diff to decide the kind from actual inserted/deleted line counts
/// rather than just checking for empty strings.
pub fn render_diff_fact(file_path: &str, old_text: &str, new_text: &str) -> Option<String> {
    if old_text == new_text {
        return None;
    }

    let diff = similar::TextDiff::from_lines(old_text, new_text);
    let mut inserted = 0usize;
    let mut deleted = 0usize;
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Insert => inserted += 1,
            similar::ChangeTag::Delete => deleted += 1,
            similar::ChangeTag::Equal => {}
        }
    }

    let kind = if deleted == 0 && inserted > 0 {
        DiffKind::Addition
    } else if inserted == 0 && deleted > 0 {
        DiffKind::Deletion
    } else {
        DiffKind::Replacement
    };

    let old_first = old_text.lines().next().unwrap_or("").trim();
    let new_first = new_text.lines().next().unwrap_or("").trim();

    let modification = if kind == DiffKind::Replacement && !old_first.is_empty() && !new_first.is_empty() && old_first != new_first {
        Some(format!(r#" "{old_first}" → "{new_first}""#))
    } else {
        None
    };

    Some(format!(
        "[DIFF {file_path} {}]{}",
        kind.as_str(),
        modification.unwrap_or_default()
    ))
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

/// Derive `facts` (≤5, each ≤200 chars): file paths touched, structured
/// diffs for edits, and test/error lines scraped from the response.
pub fn derive_facts(
    tool_name: &str,
    input: &ToolPayload,
    tool_response: &str,
) -> Vec<String> {
    let mut facts = Vec::new();

    match tool_name {
        "Read" | "NotebookRead" => {
            if let Some(path) = input.field("file_path") {
                facts.push(format!("Read {path}"));
            }
        }
        "Write" => {
            if let Some(path) = input.field("file_path") {
                facts.push(format!("Wrote {path}"));
            }
        }
        "Edit" | "MultiEdit" | "NotebookEdit" => {
            if let Some(path) = input.field("file_path") {
                let old_text = input.field("old_string").unwrap_or_default();
                let new_text = input.field("new_string").unwrap_or_default();
                if let Some(diff_fact) = render_diff_fact(&path, &old_text, &new_text) {
                    facts.push(diff_fact);
                } else {
                    facts.push(format!("Modified {path}"));
                }
            }
        }
        "Bash" | "BashOutput" => {
            if let Some(cmd) = input.field("command") {
                facts.push(format!("Ran `{cmd}`"));
            }
        }
        "Grep" | "Glob" => {
            if let Some(pattern) = input.field("pattern") {
                facts.push(format!("Searched for `{pattern}`"));
            }
        }
        _ => {}
    }

    if lower_contains(tool_response, "all tests passed")
        || lower_contains(tool_response, "tests passed")
        || lower_contains(tool_response, "test result: ok")
    {
        facts.push("Tests passed".to_string());
    }

    if has_error_indicator(tool_response) {
        facts.push("Errors encountered".to_string());
    }

    facts.truncate(MAX_FACTS);
    facts.into_iter().map(|f| truncate_chars(&f, MAX_FACT_CHARS)).collect()
}

const BENIGN_ERROR_FORMS: &[&str] = &["0 errors", "no errors", "no errors found", "error: none", "errors: 0"];
const ERROR_INDICATORS: &[&str] = &["error:", "exception", "traceback", "panicked at", "failed with", "fatal:"];

/// Substrings that indicate an error occurred, excluding benign forms
/// like "0 errors" or "no errors found".
fn has_error_indicator(text: &str) -> bool {
    let lower = text.to_lowercase();
    if BENIGN_ERROR_FORMS.iter().any(|b| lower.contains(b)) {
        return false;
    }
    ERROR_INDICATORS.iter().any(|i| lower.contains(i))
}

/// Closed intent taxonomy per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Bugfix,
    Feature,
    Refactor,
    Testing,
    Documentation,
    Configuration,
    Optimization,
    Investigation,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Bugfix => "bugfix",
            Intent::Feature => "feature",
            Intent::Refactor => "refactor",
            Intent::Testing => "testing",
            Intent::Documentation => "documentation",
            Intent::Configuration => "configuration",
            Intent::Optimization => "optimization",
            Intent::Investigation => "investigation",
        }
    }
}

/// Detect the best-matching intent from prompt text, tool name, touched
/// file extensions, and the command string. Falls back to
/// `Investigation` when nothing matches, per spec §3.
pub fn detect_intent(prompt_text: &str, tool_name: &str, file_path: Option<&str>, command: Option<&str>) -> Intent {
    let haystack = format!(
        "{} {} {} {}",
        prompt_text.to_lowercase(),
        tool_name.to_lowercase(),
        file_path.unwrap_or("").to_lowercase(),
        command.unwrap_or("").to_lowercase()
    );

    const RULES: &[(&[&str], Intent)] = &[
        (&["fix", "bug", "broken", "error", "crash", "issue"], Intent::Bugfix),
        (&["test", "spec", "pytest", "jest", "cargo test"], Intent::Testing),
        (&["refactor", "clean up", "simplify", "restructure"], Intent::Refactor),
        (&["document", "readme", "docstring", "comment"], Intent::Documentation),
        (&["config", "settings", ".toml", ".yaml", ".yml", ".env"], Intent::Configuration),
        (&["optimi", "performance", "speed up", "faster"], Intent::Optimization),
        (&["add", "implement", "feature", "new "], Intent::Feature),
    ];

    for (keywords, intent) in RULES {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *intent;
        }
    }
    Intent::Investigation
}

/// Derive `concepts` (≤8, each ≤50 chars): language tags, vcs/testing/
/// research flags, extracted code tokens for edits, and a trailing
/// `intent:<name>` tag.
pub fn derive_concepts(
    tool_name: &str,
    input: &ToolPayload,
    prompt_text: &str,
) -> Vec<String> {
    let mut concepts = Vec::new();
    let file_path = input.field("file_path");
    let command = input.field("command");

    if let Some(path) = &file_path {
        if let Some(lang) = language_tag(path) {
            concepts.push(lang.to_string());
        }
    }

    if let Some(cmd) = &command {
        let lower = cmd.to_lowercase();
        if lower.starts_with("git") {
            concepts.push("version-control".to_string());
        }
        if lower.contains("test") || lower.contains("pytest") || lower.contains("jest") {
            concepts.push("testing".to_string());
        }
    }

    if matches!(tool_name, "WebSearch" | "WebFetch") {
        concepts.push("research".to_string());
    }

    if matches!(tool_name, "Edit" | "MultiEdit" | "NotebookEdit") {
        let old_text = input.field("old_string").unwrap_or_default();
        let new_text = input.field("new_string").unwrap_or_default();
        for token in extract_code_tokens(&new_text).into_iter().chain(extract_code_tokens(&old_text)) {
            if !concepts.contains(&token) {
                concepts.push(token);
            }
        }
    }

    let intent = detect_intent(prompt_text, tool_name, file_path.as_deref(), command.as_deref());
    concepts.push(format!("intent:{}", intent.as_str()));

    concepts.truncate(MAX_CONCEPTS);
    concepts.into_iter().map(|c| truncate_chars(&c, MAX_CONCEPT_CHARS)).collect()
}

/// Summarizes a session's observations into a one-line completion note plus
/// the deduplicated file lists, for a session-end summary's `completed`,
/// `files_read`, and `files_modified` fields.
pub fn derive_session_completion(observations: &[Observation]) -> (String, Vec<String>, Vec<String>) {
    if observations.is_empty() {
        return ("No activity recorded".to_string(), Vec::new(), Vec::new());
    }

    let mut files_read = Vec::new();
    let mut files_modified = Vec::new();
    let mut commands_executed = 0usize;

    for obs in observations {
        for f in &obs.files_read {
            if !files_read.contains(f) {
                files_read.push(f.clone());
            }
        }
        for f in &obs.files_modified {
            if !files_modified.contains(f) {
                files_modified.push(f.clone());
            }
        }
        if obs.r#type == ObservationType::Execute {
            commands_executed += 1;
        }
    }

    let completed = format!(
        "{} file(s) modified, {} file(s) read, {} command(s) executed.",
        files_modified.len(),
        files_read.len(),
        commands_executed
    );

    (completed, files_read, files_modified)
}

fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Derive a session's `decisions` (≤5): one line per write/edit
/// observation whose before/after first-line tokens differ, formatted
/// `"<file> [<intents>]: \"<before>\" → \"<after>\""` (spec §3).
pub fn derive_decisions(observations: &[Observation]) -> Vec<String> {
    let mut decisions = Vec::new();

    for obs in observations {
        if obs.r#type != ObservationType::Write {
            continue;
        }
        if decisions.len() >= MAX_DECISIONS {
            break;
        }

        let payload = ToolPayload::from_json_value(serde_json::from_str::<Value>(&obs.tool_input).ok().as_ref());
        let file_path = payload.field("file_path").unwrap_or_else(|| obs.title.clone());
        let old_text = payload.field("old_string").unwrap_or_default();
        let new_text = payload
            .field("new_string")
            .or_else(|| payload.field("content"))
            .unwrap_or_default();

        let old_first = old_text.lines().next().unwrap_or("").trim();
        let new_first = new_text.lines().next().unwrap_or("").trim();
        if tokens(old_first) == tokens(new_first) {
            continue;
        }

        let intents: Vec<&str> = obs.concepts.iter().filter_map(|c| c.strip_prefix("intent:")).collect();
        decisions.push(format!(r#"{file_path} [{}]: "{old_first}" → "{new_first}""#, intents.join(", ")));
    }

    decisions
}

/// Derive a session's `errors` (≤10): response lines from execute
/// observations that carry an error indicator, excluding benign forms
/// (spec §3).
pub fn derive_errors(observations: &[Observation]) -> Vec<String> {
    let mut errors = Vec::new();

    for obs in observations {
        if obs.r#type != ObservationType::Execute {
            continue;
        }
        for line in obs.tool_response.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if has_error_indicator(trimmed) {
                errors.push(trimmed.to_string());
                if errors.len() >= MAX_ERRORS {
                    return errors;
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_payload(json: serde_json::Value) -> ToolPayload {
        ToolPayload::Json(json)
    }

    #[test]
    fn classify_type_covers_all_known_tools() {
        assert_eq!(classify_type("Read"), ObservationType::Read);
        assert_eq!(classify_type("Edit"), ObservationType::Write);
        assert_eq!(classify_type("Bash"), ObservationType::Execute);
        assert_eq!(classify_type("Grep"), ObservationType::Search);
        assert_eq!(classify_type("SomePluginTool"), ObservationType::Other);
    }

    #[test]
    fn classify_type_fallback_heuristic() {
        assert_eq!(classify_type("CustomFileReader"), ObservationType::Read);
        assert_eq!(classify_type("CustomSearchTool"), ObservationType::Search);
    }

    #[test]
    fn template_derivation_is_pure_and_deterministic() {
        let payload = json_payload(serde_json::json!({"file_path": "src/index.ts"}));
        let a = derive_title_subtitle_narrative("Read", &payload);
        let b = derive_title_subtitle_narrative("Read", &payload);
        assert_eq!(a, b);
        assert_eq!(a.0, "Read src/index.ts");
    }

    #[test]
    fn null_payload_never_panics() {
        let payload = ToolPayload::Null;
        let (title, _, _) = derive_title_subtitle_narrative("Read", &payload);
        assert!(title.contains("unknown file"));
        let facts = derive_facts("Read", &payload, "");
        assert!(facts.is_empty());
    }

    #[test]
    fn text_payload_treated_as_primary_field() {
        let payload = ToolPayload::Text("npm test".to_string());
        assert_eq!(payload.field("command").as_deref(), Some("npm test"));
    }

    #[test]
    fn facts_capped_at_five_entries() {
        let payload = json_payload(serde_json::json!({"file_path": "a.rs"}));
        let facts = derive_facts("Read", &payload, "error: boom\nAll tests passed");
        assert!(facts.len() <= MAX_FACTS);
    }

    #[test]
    fn facts_include_tests_passed_and_errors() {
        let payload = ToolPayload::Null;
        let facts = derive_facts("Bash", &payload, "Running...\nAll tests passed\nerror: flaky retry");
        assert!(facts.iter().any(|f| f == "Tests passed"));
        assert!(facts.iter().any(|f| f == "Errors encountered"));
    }

    #[test]
    fn benign_zero_errors_does_not_trigger_error_fact() {
        assert!(!has_error_indicator("Build succeeded, 0 errors"));
        assert!(!has_error_indicator("no errors found in output"));
    }

    #[test]
    fn diff_fact_classifies_addition_deletion_replacement() {
        assert_eq!(
            render_diff_fact("x.rs", "", "fn new() {}").unwrap(),
            "[DIFF x.rs addition]"
        );
        assert_eq!(
            render_diff_fact("x.rs", "fn old() {}", "").unwrap(),
            "[DIFF x.rs deletion]"
        );
        let replacement = render_diff_fact("x.rs", "fn old() {}", "fn renewed() {}").unwrap();
        assert!(replacement.starts_with("[DIFF x.rs replacement]"));
        assert!(replacement.contains("→"));
    }

    #[test]
    fn diff_fact_none_when_unchanged() {
        assert!(render_diff_fact("x.rs", "same", "same").is_none());
    }

    #[test]
    fn concepts_include_language_and_intent_tags() {
        let payload = json_payload(serde_json::json!({"file_path": "src/lib.rs"}));
        let concepts = derive_concepts("Read", &payload, "fix the bug in parsing");
        assert!(concepts.contains(&"lang:rust".to_string()));
        assert!(concepts.iter().any(|c| c.starts_with("intent:")));
        assert_eq!(concepts.last().unwrap(), "intent:bugfix");
    }

    #[test]
    fn concepts_capped_at_eight_entries() {
        let payload = json_payload(serde_json::json!({
            "file_path": "src/lib.rs",
            "old_string": "fn a(){} fn b(){} fn c(){} class D{} class E{}",
            "new_string": "fn a2(){} fn b2(){} fn c2(){} class D2{} class E2{}"
        }));
        let concepts = derive_concepts("Edit", &payload, "refactor this");
        assert!(concepts.len() <= MAX_CONCEPTS);
    }

    #[test]
    fn intent_defaults_to_investigation() {
        assert_eq!(
            detect_intent("just poking around", "Read", None, None).as_str(),
            "investigation"
        );
    }

    #[test]
    fn intent_detects_testing_from_command() {
        assert_eq!(
            detect_intent("", "Bash", None, Some("cargo test")).as_str(),
            "testing"
        );
    }

    fn observation(r#type: ObservationType, files_read: Vec<&str>, files_modified: Vec<&str>) -> Observation {
        Observation {
            id: "obs1".into(),
            session_id: "s1".into(),
            project: "proj".into(),
            tool_name: "Read".into(),
            tool_input: "{}".into(),
            tool_response: "{}".into(),
            cwd: "/tmp".into(),
            timestamp: 0,
            r#type,
            title: "t".into(),
            subtitle: "s".into(),
            narrative: "n".into(),
            facts: vec![],
            concepts: vec![],
            prompt_number: Some(1),
            files_read: files_read.into_iter().map(String::from).collect(),
            files_modified: files_modified.into_iter().map(String::from).collect(),
            content_hash: "h".into(),
            compressed_summary: None,
            is_compressed: false,
            embedding: None,
        }
    }

    #[test]
    fn session_completion_reports_no_activity_when_empty() {
        let (completed, files_read, files_modified) = derive_session_completion(&[]);
        assert_eq!(completed, "No activity recorded");
        assert!(files_read.is_empty());
        assert!(files_modified.is_empty());
    }

    #[test]
    fn session_completion_dedupes_files_and_counts_commands() {
        let observations = vec![
            observation(ObservationType::Read, vec!["feature.ts"], vec![]),
            observation(ObservationType::Write, vec![], vec!["feature.ts"]),
            observation(ObservationType::Write, vec![], vec!["feature.ts", "other.rs"]),
            observation(ObservationType::Execute, vec![], vec![]),
        ];
        let (completed, files_read, files_modified) = derive_session_completion(&observations);
        assert_eq!(files_read, vec!["feature.ts".to_string()]);
        assert_eq!(files_modified, vec!["feature.ts".to_string(), "other.rs".to_string()]);
        assert_eq!(completed, "2 file(s) modified, 1 file(s) read, 1 command(s) executed.");
    }

    #[test]
    fn decisions_render_when_first_lines_differ() {
        let edit = Observation {
            tool_input: r#"{"file_path":"src/lib.rs","old_string":"fn old() {}","new_string":"fn new() {}"}"#.into(),
            concepts: vec!["intent:refactor".into()],
            ..observation(ObservationType::Write, vec![], vec!["src/lib.rs"])
        };
        let decisions = derive_decisions(&[edit]);
        assert_eq!(decisions, vec![r#"src/lib.rs [refactor]: "fn old() {}" → "fn new() {}""#.to_string()]);
    }

    #[test]
    fn decisions_skip_when_first_line_tokens_match() {
        let edit = Observation {
            tool_input: r#"{"file_path":"src/lib.rs","old_string":"fn  same()  {}","new_string":"fn same() {}"}"#.into(),
            ..observation(ObservationType::Write, vec![], vec!["src/lib.rs"])
        };
        assert!(derive_decisions(&[edit]).is_empty());
    }

    #[test]
    fn decisions_are_capped_at_five() {
        let edits: Vec<Observation> = (0..8)
            .map(|i| {
                let file = format!("f{i}.rs");
                Observation {
                    tool_input: format!(r#"{{"file_path":"{file}","old_string":"a","new_string":"b"}}"#),
                    ..observation(ObservationType::Write, vec![], vec![file.as_str()])
                }
            })
            .collect();
        assert_eq!(derive_decisions(&edits).len(), MAX_DECISIONS);
    }

    #[test]
    fn errors_scan_execute_observation_response_lines() {
        let execute = Observation {
            tool_response: "running suite\nerror: assertion failed at line 12\nexit 1".into(),
            ..observation(ObservationType::Execute, vec![], vec![])
        };
        let errors = derive_errors(&[execute]);
        assert_eq!(errors, vec!["error: assertion failed at line 12".to_string()]);
    }

    #[test]
    fn errors_exclude_benign_forms_and_non_execute_observations() {
        let execute = Observation {
            tool_response: "build finished, 0 errors, 2 warnings".into(),
            ..observation(ObservationType::Execute, vec![], vec![])
        };
        let read = Observation {
            tool_response: "error: not actually executed".into(),
            ..observation(ObservationType::Read, vec![], vec![])
        };
        assert!(derive_errors(&[execute, read]).is_empty());
    }

    #[test]
    fn errors_are_capped_at_ten() {
        let mut response = String::new();
        for i in 0..15 {
            response.push_str(&format!("error: failure {i}\n"));
        }
        let execute = Observation {
            tool_response: response,
            ..observation(ObservationType::Execute, vec![], vec![])
        };
        assert_eq!(derive_errors(&[execute]).len(), MAX_ERRORS);
    }
}
