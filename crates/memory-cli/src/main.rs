// crates/memory-cli/src/main.rs
//! The `agentkits-memory` binary: five stdin-JSON hook handlers plus ten
//! standalone subcommands, all dispatched from one `clap` enum (spec §6's
//! command table). Every hook handler always exits 0 and prints exactly one
//! JSON line to stdout — logs go to stderr so they never corrupt that line.

mod commands;
mod handlers;
mod provider;
mod transcript;

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "agentkits-memory", about = "Coding-agent memory pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hook: inject session context (stdin: HookInput, stdout: HookResponse).
    Context,
    /// Hook: upsert the session and enqueue the initial prompt's embedding.
    SessionInit,
    /// Hook: derive and store one observation from a tool invocation.
    Observation,
    /// Hook: write the session-end summary row.
    Summarize,
    /// Hook: record a mid-session user prompt.
    UserMessage,
    /// Enrich one observation synchronously (no queue involved).
    Enrich { obs_id: String, cwd: PathBuf },
    /// Read the transcript's last assistant message and enrich a summary's
    /// notes/next-steps.
    EnrichSummary {
        session_id: String,
        cwd: PathBuf,
        transcript: PathBuf,
    },
    /// Drain one batch of the Embed worker.
    EmbedSession { cwd: PathBuf },
    /// Drain one batch of the Enrich worker.
    EnrichSession { cwd: PathBuf },
    /// Drain one batch of the Compress worker.
    CompressSession { cwd: PathBuf },
    /// Run the compress/archive/delete/vacuum pass, print the report as JSON.
    Lifecycle {
        cwd: PathBuf,
        #[arg(long = "compress-days")]
        compress_days: Option<u32>,
        #[arg(long = "archive-days")]
        archive_days: Option<u32>,
        #[arg(long)]
        delete: bool,
        #[arg(long = "delete-days")]
        delete_days: Option<u32>,
    },
    /// Print database statistics as JSON.
    LifecycleStats { cwd: PathBuf },
    /// Export a project's full history to a JSON document.
    Export { cwd: PathBuf, project: String, path: PathBuf },
    /// Import a previously-exported project document.
    Import { cwd: PathBuf, path: PathBuf },
    /// Read, mutate, or reset `settings.json`.
    Settings {
        cwd: PathBuf,
        #[arg(value_name = "KEY=VALUE")]
        sets: Vec<String>,
        #[arg(long)]
        reset: bool,
    },
}

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MEMORY_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn read_stdin() -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = std::io::stdin().read_to_end(&mut buf);
    buf
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Context => handlers::print_response(handlers::run_context(&read_stdin())),
        Command::SessionInit => handlers::print_response(handlers::run_session_init(&read_stdin())),
        Command::Observation => handlers::print_response(handlers::run_observation(&read_stdin())),
        Command::Summarize => handlers::print_response(handlers::run_summarize(&read_stdin())),
        Command::UserMessage => handlers::print_response(handlers::run_user_message(&read_stdin())),

        Command::Enrich { obs_id, cwd } => commands::exit_on_error(commands::enrich(&obs_id, &cwd)),
        Command::EnrichSummary { session_id, cwd, transcript } => {
            commands::exit_on_error(commands::enrich_summary(&session_id, &cwd, &transcript))
        }
        Command::EmbedSession { cwd } => commands::exit_on_error(commands::run_worker(&cwd, agentkits_memory_workers::WorkerKind::Embed)),
        Command::EnrichSession { cwd } => commands::exit_on_error(commands::run_worker(&cwd, agentkits_memory_workers::WorkerKind::Enrich)),
        Command::CompressSession { cwd } => {
            commands::exit_on_error(commands::run_worker(&cwd, agentkits_memory_workers::WorkerKind::Compress))
        }
        Command::Lifecycle {
            cwd,
            compress_days,
            archive_days,
            delete,
            delete_days,
        } => commands::exit_on_error(commands::lifecycle(&cwd, compress_days, archive_days, delete, delete_days)),
        Command::LifecycleStats { cwd } => commands::exit_on_error(commands::lifecycle_stats(&cwd)),
        Command::Export { cwd, project, path } => commands::exit_on_error(commands::export(&cwd, &project, &path)),
        Command::Import { cwd, path } => commands::exit_on_error(commands::import(&cwd, &path)),
        Command::Settings { cwd, sets, reset } => commands::exit_on_error(commands::settings(&cwd, &sets, reset)),
    }
}
