// crates/memory-cli/src/commands.rs
//! The ten standalone subcommands (spec §6). Unlike the hook handlers,
//! these report failure on stderr and a non-zero exit code — there's no
//! host agent turn waiting on them.

use std::path::Path;

use agentkits_memory_core::paths;
use agentkits_memory_core::settings::Settings;
use agentkits_memory_core::time::now_ms;
use agentkits_memory_lifecycle::{collect_stats, export_project, import_project, run_lifecycle, ExportDocument, LifecycleConfig};
use agentkits_memory_providers::{build_enrich_summary_prompt, parse_enrich_summary_response};
use agentkits_memory_store::Store;
use agentkits_memory_workers::{enrich::enrich_one, run_worker_once, WorkerKind};

use crate::provider::{build_ai_provider, build_embedding_provider};
use crate::transcript;

pub fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn open_store(cwd: &Path) -> anyhow::Result<(Store, Settings)> {
    let memory_dir = paths::memory_dir(cwd, None);
    let store = Store::open_default(&memory_dir)?;
    let settings = Settings::load(&paths::settings_path(&memory_dir));
    Ok((store, settings))
}

/// Enrich one observation synchronously — used when a caller wants the
/// enrichment to happen inline rather than waiting on the queue (spec §6).
pub fn enrich(obs_id: &str, cwd: &Path) -> anyhow::Result<()> {
    let (store, settings) = open_store(cwd)?;
    let ai = build_ai_provider(&settings);
    let enriched = enrich_one(&store, ai.as_ref(), obs_id)?;
    if !enriched {
        anyhow::bail!("enrichment failed for observation {obs_id}");
    }
    Ok(())
}

pub fn enrich_summary(session_id: &str, cwd: &Path, transcript_path: &Path) -> anyhow::Result<()> {
    let (store, settings) = open_store(cwd)?;
    let Some(last_message) = transcript::last_assistant_message(transcript_path) else {
        tracing::debug!(session_id, "no assistant message found in transcript, skipping");
        return Ok(());
    };

    let summaries = store.summaries_for_session(session_id)?;
    let Some(summary) = summaries.last() else {
        tracing::debug!(session_id, "no summary row to enrich");
        return Ok(());
    };

    let prompt = build_enrich_summary_prompt(&summary.request, &last_message);
    let ai = build_ai_provider(&settings);
    let Some(raw) = ai.run(&prompt, "You extract notes and next steps from a coding session. Reply with JSON only.", 30_000) else {
        return Ok(());
    };
    let Some(parsed) = parse_enrich_summary_response(&raw) else {
        return Ok(());
    };

    store.enrich_summary(summary.id, &parsed.notes, &parsed.next_steps)?;
    Ok(())
}

pub fn run_worker(cwd: &Path, kind: WorkerKind) -> anyhow::Result<()> {
    let memory_dir = paths::memory_dir(cwd, None);
    let mut store = Store::open_default(&memory_dir)?;
    let settings = Settings::load(&paths::settings_path(&memory_dir));
    let ai = build_ai_provider(&settings);
    let embedder = build_embedding_provider();

    run_worker_once(&memory_dir, kind, &mut store, ai.as_ref(), embedder.as_ref())?;
    Ok(())
}

pub fn lifecycle(cwd: &Path, compress_days: Option<u32>, archive_days: Option<u32>, delete: bool, delete_days: Option<u32>) -> anyhow::Result<()> {
    let (mut store, _) = open_store(cwd)?;
    let mut config = LifecycleConfig::default();
    if let Some(days) = compress_days {
        config.compress_after_days = days;
    }
    if let Some(days) = archive_days {
        config.archive_after_days = days;
    }
    config.auto_delete = delete;
    if let Some(days) = delete_days {
        config.delete_after_days = days;
    }

    let report = run_lifecycle(&mut store, &config, now_ms())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn lifecycle_stats(cwd: &Path) -> anyhow::Result<()> {
    let (store, _) = open_store(cwd)?;
    let stats = collect_stats(&store)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub fn export(cwd: &Path, project: &str, path: &Path) -> anyhow::Result<()> {
    let (store, _) = open_store(cwd)?;
    let doc = export_project(&store, project)?;
    let json = serde_json::to_vec_pretty(&doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn import(cwd: &Path, path: &Path) -> anyhow::Result<()> {
    let (store, _) = open_store(cwd)?;
    let raw = std::fs::read(path)?;
    let doc: ExportDocument = serde_json::from_slice(&raw)?;
    let report = import_project(&store, &doc, now_ms())?;
    println!(
        "{{\"sessionsImported\":{},\"promptsImported\":{},\"promptsDeduped\":{},\"observationsImported\":{},\"observationsDeduped\":{}}}",
        report.sessions_imported, report.prompts_imported, report.prompts_deduped, report.observations_imported, report.observations_deduped
    );
    Ok(())
}

/// Read, mutate via `KEY=VALUE` pairs (dotted keys into `Settings`'
/// nested structs), or reset `settings.json`, then print the result.
pub fn settings(cwd: &Path, sets: &[String], reset: bool) -> anyhow::Result<()> {
    let memory_dir = paths::memory_dir(cwd, None);
    let settings_path = paths::settings_path(&memory_dir);

    let mut settings = if reset { Settings::default() } else { Settings::load(&settings_path) };

    for pair in sets {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got {pair:?}"))?;
        apply_setting(&mut settings, key, value)?;
    }

    if reset || !sets.is_empty() {
        settings.save(&settings_path)?;
    }

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "context.showToolGuidance" => settings.context.show_tool_guidance = parse_bool(value)?,
        "context.showSummaries" => settings.context.show_summaries = parse_bool(value)?,
        "context.showPrompts" => settings.context.show_prompts = parse_bool(value)?,
        "context.showObservations" => settings.context.show_observations = parse_bool(value)?,
        "context.maxObservations" => settings.context.max_observations = value.parse()?,
        "context.maxPrompts" => settings.context.max_prompts = value.parse()?,
        "context.maxSummaries" => settings.context.max_summaries = value.parse()?,
        "aiProvider.provider" => {
            let ai = settings.ai_provider.get_or_insert_with(Default::default);
            ai.provider = match value {
                "local" => agentkits_memory_core::settings::ProviderKind::Local,
                "hosted-a" => agentkits_memory_core::settings::ProviderKind::HostedA,
                "hosted-b" => agentkits_memory_core::settings::ProviderKind::HostedB,
                other => anyhow::bail!("unknown provider kind {other:?}"),
            };
        }
        "aiProvider.apiKey" => settings.ai_provider.get_or_insert_with(Default::default).api_key = Some(value.to_string()),
        "aiProvider.model" => settings.ai_provider.get_or_insert_with(Default::default).model = Some(value.to_string()),
        "aiProvider.baseUrl" => settings.ai_provider.get_or_insert_with(Default::default).base_url = Some(value.to_string()),
        other => anyhow::bail!("unknown settings key {other:?}"),
    }
    Ok(())
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => anyhow::bail!("expected true/false, got {other:?}"),
    }
}
