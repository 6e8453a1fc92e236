// crates/memory-cli/tests/hook_scenarios.rs
//! End-to-end scenarios driving the compiled binary as a real hook caller
//! would: JSON on stdin, one JSON line back on stdout, a project directory
//! as `cwd`. No in-process code path is shared with `src/` here — this is
//! deliberately black-box.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

fn run(cwd: &Path, subcommand: &str, stdin: &Value) -> Value {
    let exe = env!("CARGO_BIN_EXE_agentkits-memory");
    let mut child = Command::new(exe)
        .arg(subcommand)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn binary");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.to_string().as_bytes())
        .expect("write stdin");

    let output = child.wait_with_output().expect("wait for binary");
    assert!(output.status.success(), "{subcommand} exited nonzero: {}", String::from_utf8_lossy(&output.stderr));

    let line = String::from_utf8(output.stdout).expect("stdout utf8");
    serde_json::from_str(line.trim()).unwrap_or_else(|e| panic!("{subcommand} produced non-JSON stdout {line:?}: {e}"))
}

fn hook_input(cwd: &Path, session_id: &str, extra: Value) -> Value {
    let mut base = json!({
        "sessionId": session_id,
        "cwd": cwd.to_string_lossy(),
        "project": "demo",
    });
    let base_obj = base.as_object_mut().unwrap();
    if let Value::Object(extra_obj) = extra {
        for (k, v) in extra_obj {
            base_obj.insert(k, v);
        }
    }
    base
}

fn observation_count(cwd: &Path, session_id: &str) -> i64 {
    let db_path = cwd.join(".claude/memory/memory.db");
    let conn = rusqlite::Connection::open(db_path).expect("open db directly");
    conn.query_row("SELECT COUNT(*) FROM observations WHERE session_id = ?1", [session_id], |row| row.get(0))
        .expect("count observations")
}

/// Scenario 1 (spec §8): a fresh session with four tool uses, summarized on
/// `user_exit`, then a follow-up session in the same project picks up the
/// prior summary and recent activity as injected context.
#[test]
fn scenario_fresh_session_four_tools_then_resume() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path();
    let session = "S1";

    let init = hook_input(cwd, session, json!({"prompt": "add a feature"}));
    let resp = run(cwd, "session-init", &init);
    assert_eq!(resp["continue"], true);

    let observation = |tool_name: &str, tool_input: Value, tool_response: Value| {
        hook_input(cwd, session, json!({"toolName": tool_name, "toolInput": tool_input, "toolResponse": tool_response}))
    };

    run(cwd, "observation", &observation("Read", json!({"file_path": "src/index.ts"}), json!("contents")));
    run(cwd, "observation", &observation("Grep", json!({"pattern": "function", "path": "src"}), json!("3 matches")));
    run(cwd, "observation", &observation("Write", json!({"file_path": "src/feature.ts"}), json!("ok")));
    run(cwd, "observation", &observation("Bash", json!({"command": "npm test"}), json!("all tests passed")));

    assert_eq!(observation_count(cwd, session), 4);

    let summarize_input = hook_input(cwd, session, json!({"stopReason": "user_exit"}));
    let summarize_resp = run(cwd, "summarize", &summarize_input);
    assert_eq!(summarize_resp["continue"], true);

    let db_path = cwd.join(".claude/memory/memory.db");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let status: String = conn
        .query_row("SELECT status FROM sessions WHERE session_id = ?1", [session], |row| row.get(0))
        .expect("session row");
    assert_eq!(status, "completed");

    let completed: String = conn
        .query_row("SELECT completed FROM session_summaries WHERE session_id = ?1", [session], |row| row.get(0))
        .expect("summary row");
    assert!(completed.contains("file(s) modified"), "completed summary was: {completed}");
    assert!(completed.contains("file(s) read"), "completed summary was: {completed}");
    assert!(completed.contains("command(s) executed"), "completed summary was: {completed}");

    let context_input = hook_input(cwd, "S2", json!({"prompt": "keep going"}));
    let context_resp = run(cwd, "context", &context_input);
    let additional = context_resp["additional_context"].as_str().expect("additional_context present");
    assert!(additional.contains("Previous Session Summaries"), "context was: {additional}");
    assert!(additional.contains("Recent Activity"), "context was: {additional}");
}

/// Scenario 2 (spec §8): two sessions in different projects never see each
/// other's observations, even though they share the same on-disk database.
#[test]
fn scenario_cross_project_isolation() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path();

    let init_a = json!({"sessionId": "S_a", "cwd": cwd.to_string_lossy(), "project": "A", "prompt": "work on A"});
    run(cwd, "session-init", &init_a);
    let obs_a = json!({
        "sessionId": "S_a", "cwd": cwd.to_string_lossy(), "project": "A",
        "toolName": "Write", "toolInput": {"file_path": "a.ts"}, "toolResponse": "ok",
    });
    run(cwd, "observation", &obs_a);

    let init_b = json!({"sessionId": "S_b", "cwd": cwd.to_string_lossy(), "project": "B", "prompt": "work on B"});
    run(cwd, "session-init", &init_b);
    let obs_b = json!({
        "sessionId": "S_b", "cwd": cwd.to_string_lossy(), "project": "B",
        "toolName": "Read", "toolInput": {"file_path": "b.ts"}, "toolResponse": "contents",
    });
    run(cwd, "observation", &obs_b);

    let db_path = cwd.join(".claude/memory/memory.db");
    let conn = rusqlite::Connection::open(&db_path).unwrap();

    let project_a: String = conn
        .query_row("SELECT project FROM sessions WHERE session_id = ?1", ["S_a"], |row| row.get(0))
        .unwrap();
    assert_eq!(project_a, "A");
    let project_b: String = conn
        .query_row("SELECT project FROM sessions WHERE session_id = ?1", ["S_b"], |row| row.get(0))
        .unwrap();
    assert_eq!(project_b, "B");

    let obs_a_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM observations WHERE project = 'A'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(obs_a_count, 1);
    let obs_a_file: String = conn
        .query_row("SELECT files_modified FROM observations WHERE project = 'A'", [], |row| row.get(0))
        .unwrap();
    assert!(obs_a_file.contains("a.ts"));

    let obs_b_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM observations WHERE project = 'B'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(obs_b_count, 1);
    let obs_b_file: String = conn
        .query_row("SELECT files_read FROM observations WHERE project = 'B'", [], |row| row.get(0))
        .unwrap();
    assert!(obs_b_file.contains("b.ts"));
}

/// Scenario 3 (spec §8): the same tool invocation submitted twice within
/// the observation dedup window collapses to one row.
#[test]
fn scenario_duplicate_observation_deduped() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path();
    let session = "S";

    run(cwd, "session-init", &hook_input(cwd, session, json!({"prompt": "inspect x"})));

    let obs = hook_input(cwd, session, json!({"toolName": "Read", "toolInput": {"file_path": "x"}, "toolResponse": "contents"}));

    let first = run(cwd, "observation", &obs);
    assert_eq!(first["continue"], true);
    std::thread::sleep(std::time::Duration::from_millis(10));
    let second = run(cwd, "observation", &obs);
    assert_eq!(second["continue"], true);

    assert_eq!(observation_count(cwd, session), 1);
}
