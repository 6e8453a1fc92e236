// crates/memory-retrieval/src/lib.rs
//! Text, vector, and hybrid retrieval over the memory store (spec §4.7).
//!
//! Two retrieval surfaces share the same scoring rules: global search over
//! `memory_entries`, and session-scoped search across the four
//! session-tagged tables. Both return a `RankedResult` heterogeneous list
//! sorted by fused score.

pub mod error;
pub mod memory_search;
pub mod ranked;
pub mod scoring;
pub mod session_search;

pub use error::{RetrievalError, RetrievalResult};
pub use memory_search::{hybrid_search, text_search, vector_search};
pub use ranked::{sort_ranked, RankedResult, SourceTable};
pub use scoring::{build_fts_query, fuse, keyword_score, sanitize_terms, FUSED_THRESHOLD, SEMANTIC_DROP_THRESHOLD, SESSION_SCAN_CAP};
pub use session_search::{session_search, SearchMode};
