// crates/memory-cli/src/handlers.rs
//! The five stdin-JSON hook handlers (spec §4.2/§6). Every public `run_*`
//! function swallows its own errors and always returns a response with
//! `continue: true` — a hook must never block the host agent (spec §7).

use std::path::{Path, PathBuf};

use agentkits_memory_core::derive::{
    classify_type, derive_concepts, derive_decisions, derive_errors, derive_facts, derive_session_completion, derive_title_subtitle_narrative, ToolPayload,
};
use agentkits_memory_core::hash::{generate_observation_id, observation_hash};
use agentkits_memory_core::hook::{parse_hook_input, HookInput, HookResponse};
use agentkits_memory_core::paths;
use agentkits_memory_core::settings::Settings;
use agentkits_memory_core::time::now_ms;
use agentkits_memory_core::types::{truncate_payload, ObservationType, TaskType, MAX_PAYLOAD_BYTES};
use agentkits_memory_queue::{enqueue, has_pending};
use agentkits_memory_store::{NewObservation, NewSessionSummary, Store};
use agentkits_memory_workers::{spawn_worker, WorkerKind};

const EMPTY_PROJECT_GUIDANCE: &str =
    "No memory recorded yet for this project. As you read, write, and run commands, this system \
     will automatically capture observations — no explicit save step is needed.";

pub fn print_response(response: HookResponse) {
    let json = serde_json::to_string(&response).unwrap_or_else(|_| r#"{"continue":true,"suppressOutput":true}"#.to_string());
    println!("{json}");
}

struct Env {
    store: Store,
    settings: Settings,
    memory_dir: PathBuf,
    cwd: PathBuf,
    project: String,
}

fn open_env(input: &HookInput) -> anyhow::Result<Env> {
    let cwd = PathBuf::from(&input.cwd);
    let project = input.project.clone().unwrap_or_else(|| paths::project_from_cwd(&cwd));
    let memory_dir = paths::memory_dir(&cwd, None);
    let store = Store::open_default(&memory_dir)?;
    let settings = Settings::load(&paths::settings_path(&memory_dir));
    Ok(Env {
        store,
        settings,
        memory_dir,
        cwd,
        project,
    })
}

fn spawn_if_pending(store: &Store, kind: WorkerKind, cwd: &Path) -> anyhow::Result<()> {
    if has_pending(store, kind.task_type())? {
        if let Err(e) = spawn_worker(kind, cwd) {
            tracing::warn!(error = %e, worker = kind.lock_name(), "failed to spawn worker");
        }
    }
    Ok(())
}

pub fn run_context(raw: &[u8]) -> HookResponse {
    let input = parse_hook_input(raw, now_ms());
    try_context(&input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "context handler failed");
        HookResponse::standard()
    })
}

fn try_context(input: &HookInput) -> anyhow::Result<HookResponse> {
    let env = open_env(input)?;
    let now = input.timestamp.unwrap_or_else(now_ms);

    let (sessions, observations, prompts) = env.store.project_activity_counts(&env.project)?;
    if sessions == 0 && observations == 0 && prompts == 0 {
        return Ok(HookResponse::with_context(EMPTY_PROJECT_GUIDANCE.to_string()));
    }

    let session = env.store.upsert_session(&input.session_id, &env.project, input.prompt.as_deref().unwrap_or(""), now)?;
    let target_session_id = if session.observation_count == 0 {
        session.parent_session_id.clone().unwrap_or(session.session_id.clone())
    } else {
        session.session_id.clone()
    };

    let doc = agentkits_memory_context::build_context(&env.store, &target_session_id, &env.settings.context, now)?;

    spawn_if_pending(&env.store, WorkerKind::Embed, &env.cwd)?;
    spawn_if_pending(&env.store, WorkerKind::Enrich, &env.cwd)?;
    spawn_if_pending(&env.store, WorkerKind::Compress, &env.cwd)?;

    Ok(HookResponse::with_context(doc))
}

pub fn run_session_init(raw: &[u8]) -> HookResponse {
    let input = parse_hook_input(raw, now_ms());
    try_session_init(&input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "session-init handler failed");
        HookResponse::standard()
    })
}

fn try_session_init(input: &HookInput) -> anyhow::Result<HookResponse> {
    let env = open_env(input)?;
    let now = input.timestamp.unwrap_or_else(now_ms);
    let prompt_text = input.prompt.as_deref().unwrap_or("");

    env.store.upsert_session(&input.session_id, &env.project, prompt_text, now)?;

    if !prompt_text.is_empty() {
        let prompt = env.store.insert_user_prompt(&input.session_id, &env.project, prompt_text, now)?;
        enqueue(&env.store, TaskType::Embed, "user_prompts", &prompt.id.to_string(), now)?;
        spawn_if_pending(&env.store, WorkerKind::Embed, &env.cwd)?;
    }

    Ok(HookResponse::standard())
}

pub fn run_observation(raw: &[u8]) -> HookResponse {
    let input = parse_hook_input(raw, now_ms());
    try_observation(&input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "observation handler failed");
        HookResponse::standard()
    })
}

fn observed_files(r#type: ObservationType, file_path: Option<&str>) -> (Vec<String>, Vec<String>) {
    match (r#type, file_path) {
        (ObservationType::Read, Some(p)) => (vec![p.to_string()], Vec::new()),
        (ObservationType::Write, Some(p)) => (Vec::new(), vec![p.to_string()]),
        _ => (Vec::new(), Vec::new()),
    }
}

fn try_observation(input: &HookInput) -> anyhow::Result<HookResponse> {
    let env = open_env(input)?;
    let now = input.timestamp.unwrap_or_else(now_ms);
    let tool_name = input.tool_name.clone().unwrap_or_else(|| "Unknown".to_string());
    let prompt_text = input.prompt.as_deref().unwrap_or("");

    env.store.upsert_session(&input.session_id, &env.project, prompt_text, now)?;

    let tool_input = ToolPayload::from_json_value(input.tool_input.as_ref());
    let tool_response = ToolPayload::from_json_value(input.tool_response.as_ref());
    let canonical_input = tool_input.canonical_string();
    let canonical_response = tool_response.canonical_string();

    let r#type = classify_type(&tool_name);
    let (title, subtitle, narrative) = derive_title_subtitle_narrative(&tool_name, &tool_input);
    let facts = derive_facts(&tool_name, &tool_input, &canonical_response);
    let concepts = derive_concepts(&tool_name, &tool_input, prompt_text);
    let (files_read, files_modified) = observed_files(r#type, tool_input.field("file_path").as_deref());

    let content_hash = observation_hash(&input.session_id, &tool_name, &canonical_input);
    let generated_id = generate_observation_id(now);
    let current_prompt_number = match env.store.next_prompt_number(&input.session_id)? {
        1 => None,
        n => Some(n - 1),
    };

    let new = NewObservation {
        id: generated_id.clone(),
        session_id: input.session_id.clone(),
        project: env.project.clone(),
        tool_name,
        tool_input: truncate_payload(&canonical_input, MAX_PAYLOAD_BYTES),
        tool_response: truncate_payload(&canonical_response, MAX_PAYLOAD_BYTES),
        cwd: input.cwd.clone(),
        timestamp: now,
        r#type,
        title,
        subtitle,
        narrative,
        facts,
        concepts,
        prompt_number: current_prompt_number,
        files_read,
        files_modified,
        content_hash,
    };

    let observation = env.store.insert_observation(new)?;
    let is_new = observation.id == generated_id;

    if is_new {
        enqueue(&env.store, TaskType::Embed, "observations", &observation.id, now)?;
        enqueue(&env.store, TaskType::Enrich, "observations", &observation.id, now)?;
        spawn_if_pending(&env.store, WorkerKind::Embed, &env.cwd)?;
        spawn_if_pending(&env.store, WorkerKind::Enrich, &env.cwd)?;
    }

    Ok(HookResponse::standard())
}

pub fn run_summarize(raw: &[u8]) -> HookResponse {
    let input = parse_hook_input(raw, now_ms());
    try_summarize(&input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "summarize handler failed");
        HookResponse::standard()
    })
}

/// `"[#1] first prompt [#2] second prompt"`, truncated to 500 chars
/// overall — spec §3's `request` aggregation.
fn aggregate_request(prompts: &[agentkits_memory_core::UserPrompt]) -> String {
    const MAX_REQUEST_CHARS: usize = 500;
    let joined = prompts
        .iter()
        .map(|p| format!("[#{}] {}", p.prompt_number, p.prompt_text))
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(MAX_REQUEST_CHARS).collect()
}

fn try_summarize(input: &HookInput) -> anyhow::Result<HookResponse> {
    let env = open_env(input)?;
    let now = input.timestamp.unwrap_or_else(now_ms);

    env.store.upsert_session(&input.session_id, &env.project, input.prompt.as_deref().unwrap_or(""), now)?;
    let observations = env.store.observations_for_session(&input.session_id)?;
    let (completed, files_read, files_modified) = derive_session_completion(&observations);

    let decisions = derive_decisions(&observations);
    let errors = derive_errors(&observations);

    let prompts = env.store.prompts_for_session(&input.session_id)?;
    let request = aggregate_request(&prompts);

    let prompt_number = match env.store.next_prompt_number(&input.session_id)? {
        1 => 1,
        n => n - 1,
    };

    let summary = env.store.insert_session_summary(NewSessionSummary {
        session_id: input.session_id.clone(),
        project: env.project.clone(),
        request,
        completed: completed.clone(),
        files_read,
        files_modified,
        next_steps: String::new(),
        notes: String::new(),
        decisions,
        errors,
        prompt_number,
        created_at: now,
    })?;

    env.store.mark_session_completed(&input.session_id, Some(&completed), now)?;
    enqueue(&env.store, TaskType::Embed, "session_summaries", &summary.id.to_string(), now)?;
    enqueue(&env.store, TaskType::Compress, "sessions", &input.session_id, now)?;

    spawn_if_pending(&env.store, WorkerKind::Embed, &env.cwd)?;
    spawn_if_pending(&env.store, WorkerKind::Compress, &env.cwd)?;

    if let Some(transcript_path) = &input.transcript_path {
        spawn_enrich_summary(&input.session_id, &env.cwd, Path::new(transcript_path));
    }

    Ok(HookResponse::standard())
}

/// Fire-and-forget re-exec into `enrich-summary`, mirroring
/// `spawn_worker`'s detach pattern — the summarize handler must not block
/// on an AI round trip (spec §4.2).
fn spawn_enrich_summary(session_id: &str, cwd: &Path, transcript_path: &Path) {
    use std::process::{Command, Stdio};
    let Ok(exe) = std::env::current_exe() else {
        return;
    };
    if let Err(e) = Command::new(exe)
        .arg("enrich-summary")
        .arg(session_id)
        .arg(cwd)
        .arg(transcript_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        tracing::warn!(error = %e, "failed to spawn enrich-summary");
    }
}

pub fn run_user_message(raw: &[u8]) -> HookResponse {
    let input = parse_hook_input(raw, now_ms());
    try_user_message(&input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "user-message handler failed");
        HookResponse::standard()
    })
}

/// Read-only: the prompt itself was already saved by `session-init` (see
/// `try_session_init` above), so this handler never writes. It only
/// reports how much memory is on hand for this project (spec §4.2/§6).
fn try_user_message(input: &HookInput) -> anyhow::Result<HookResponse> {
    let env = open_env(input)?;
    let (sessions, observations, prompts) = env.store.project_activity_counts(&env.project)?;
    eprintln!(
        "agentkits-memory: project {:?} has {sessions} prior session(s), {observations} observation(s), {prompts} prompt(s) on record",
        env.project
    );

    Ok(HookResponse::standard())
}
