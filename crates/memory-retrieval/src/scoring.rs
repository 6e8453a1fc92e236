// crates/memory-retrieval/src/scoring.rs
//! The fixed scoring constants and formulas shared by every retrieval mode
//! (spec §4.7, SPEC_FULL.md §4.7 — these are fixed values, not defaults,
//! per spec §9's Open Questions resolution).

/// Weight given to the keyword score in the fused hybrid score.
pub const KEYWORD_WEIGHT: f32 = 0.3;
/// Weight given to the semantic (cosine) score in the fused hybrid score.
pub const SEMANTIC_WEIGHT: f32 = 0.7;
/// Rows below this fused score are dropped from hybrid results.
pub const FUSED_THRESHOLD: f32 = 0.05;
/// Rows below this cosine similarity are dropped from vector results.
pub const SEMANTIC_DROP_THRESHOLD: f32 = 0.1;
/// Per-session-table scan cap for the vector pass.
pub const SESSION_SCAN_CAP: u32 = 2000;

const KEYWORD_SCORE_FLOOR: f32 = 0.3;
const KEYWORD_SCORE_DISTANCE_DIVISOR: f32 = 500.0;

/// Split a raw query into alphanumeric terms. `char::is_alphanumeric`
/// already covers CJK ideographs (they're Unicode letters), so no
/// separate script-range handling is needed beyond this filter.
pub fn sanitize_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|token| token.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|term| !term.is_empty())
        .collect()
}

/// Build an FTS5 MATCH expression: each term quoted, joined with OR.
pub fn build_fts_query(terms: &[String]) -> String {
    terms.iter().map(|t| format!("\"{t}\"")).collect::<Vec<_>>().join(" OR ")
}

/// `max(0.3, 1 - index_of_first_match / 500)` when any term is found as a
/// direct substring of `haystack`, else the floor `0.3` (spec §4.7).
pub fn keyword_score(haystack: &str, terms: &[String]) -> f32 {
    let lower = haystack.to_lowercase();
    let first_match = terms
        .iter()
        .filter_map(|term| lower.find(&term.to_lowercase()))
        .min();

    match first_match {
        Some(idx) => (1.0 - idx as f32 / KEYWORD_SCORE_DISTANCE_DIVISOR).max(KEYWORD_SCORE_FLOOR),
        None => KEYWORD_SCORE_FLOOR,
    }
}

/// `0.3 * keyword + 0.7 * semantic` (spec §4.7).
pub fn fuse(keyword: f32, semantic: f32) -> f32 {
    KEYWORD_WEIGHT * keyword + SEMANTIC_WEIGHT * semantic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_operator_characters() {
        let terms = sanitize_terms("foo! (bar) \"baz\"");
        assert_eq!(terms, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn keyword_score_decays_with_match_distance() {
        let terms = vec!["needle".to_string()];
        let close = keyword_score("needle at the start", &terms);
        let far = keyword_score(&format!("{}needle", "x".repeat(600)), &terms);
        assert!(close > far);
        assert_eq!(far, 0.3);
    }

    #[test]
    fn keyword_score_floors_at_point_three_without_a_match() {
        assert_eq!(keyword_score("nothing relevant here", &["needle".to_string()]), 0.3);
    }

    #[test]
    fn fuse_weights_semantic_more_than_keyword() {
        assert!((fuse(1.0, 0.0) - 0.3).abs() < 1e-6);
        assert!((fuse(0.0, 1.0) - 0.7).abs() < 1e-6);
    }
}
