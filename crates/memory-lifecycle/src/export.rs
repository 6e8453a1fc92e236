// crates/memory-lifecycle/src/export.rs
//! Export a project's full history to a self-describing JSON document
//! (spec §4.8).

use agentkits_memory_core::{Observation, Session, SessionDigest, SessionSummary, UserPrompt};
use agentkits_memory_store::Store;
use serde::{Deserialize, Serialize};

use crate::error::LifecycleResult;

pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Upper bound on sessions pulled per project in one export pass — high
/// enough that a real project's history never hits it, low enough to keep
/// the query planner honest about using the `started_at` index.
const EXPORT_SESSION_LIMIT: u32 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedSession {
    pub session_id: String,
    pub project: String,
    pub prompt: String,
    pub started_at: u64,
    pub ended_at: Option<u64>,
    pub status: agentkits_memory_core::SessionStatus,
    pub summary: Option<String>,
    pub prompts: Vec<UserPrompt>,
    pub observations: Vec<Observation>,
    pub session_summaries: Vec<SessionSummary>,
    pub digest: Option<SessionDigest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    pub project: String,
    pub sessions: Vec<ExportedSession>,
}

fn export_session(store: &Store, session: &Session) -> LifecycleResult<ExportedSession> {
    Ok(ExportedSession {
        session_id: session.session_id.clone(),
        project: session.project.clone(),
        prompt: session.prompt.clone(),
        started_at: session.started_at,
        ended_at: session.ended_at,
        status: session.status,
        summary: session.summary.clone(),
        prompts: store.prompts_for_session(&session.session_id)?,
        observations: store.observations_for_session(&session.session_id)?,
        session_summaries: store.summaries_for_session(&session.session_id)?,
        digest: store.get_session_digest(&session.session_id)?,
    })
}

pub fn export_project(store: &Store, project: &str) -> LifecycleResult<ExportDocument> {
    let sessions = store.recent_sessions(project, EXPORT_SESSION_LIMIT)?;
    let sessions = sessions
        .iter()
        .map(|s| export_session(store, s))
        .collect::<LifecycleResult<Vec<_>>>()?;

    Ok(ExportDocument {
        version: EXPORT_FORMAT_VERSION,
        project: project.to_string(),
        sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentkits_memory_core::ObservationType;
    use agentkits_memory_store::NewObservation;

    #[test]
    fn exports_a_session_with_its_nested_rows() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj", "do the thing", 0).unwrap();
        store.insert_user_prompt("s1", "proj", "do the thing", 0).unwrap();
        store
            .insert_observation(NewObservation {
                id: "obs1".into(),
                session_id: "s1".into(),
                project: "proj".into(),
                tool_name: "Read".into(),
                tool_input: "{}".into(),
                tool_response: "{}".into(),
                cwd: "/tmp".into(),
                timestamp: 10,
                r#type: ObservationType::Read,
                title: "t".into(),
                subtitle: "s".into(),
                narrative: "n".into(),
                facts: vec![],
                concepts: vec![],
                prompt_number: Some(1),
                files_read: vec![],
                files_modified: vec![],
                content_hash: "h1".into(),
            })
            .unwrap();

        let doc = export_project(&store, "proj").unwrap();
        assert_eq!(doc.version, EXPORT_FORMAT_VERSION);
        assert_eq!(doc.sessions.len(), 1);
        assert_eq!(doc.sessions[0].prompts.len(), 1);
        assert_eq!(doc.sessions[0].observations.len(), 1);
    }

    #[test]
    fn omits_sessions_from_other_projects() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_session("s1", "proj-a", "x", 0).unwrap();
        store.upsert_session("s2", "proj-b", "y", 0).unwrap();

        let doc = export_project(&store, "proj-a").unwrap();
        assert_eq!(doc.sessions.len(), 1);
        assert_eq!(doc.sessions[0].session_id, "s1");
    }
}
