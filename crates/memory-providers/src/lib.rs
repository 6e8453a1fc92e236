// crates/memory-providers/src/lib.rs
pub mod ai;
pub mod embedding;
pub mod error;
pub mod ops;

pub use ai::{AiProvider, HostedApiProvider, LocalCliProvider, memory_ai_override, provider_enabled};
pub use embedding::{EmbeddingProvider, LocalEmbeddingProvider, DEFAULT_DIMENSION};
pub use error::{ProviderError, ProviderResult};
pub use ops::{
    build_compress_observation_prompt, build_enrich_observation_prompt, build_enrich_summary_prompt,
    build_generate_digest_prompt, parse_compress_observation_response, parse_enrich_observation_response,
    parse_enrich_summary_response, parse_generate_digest_response, CompressObservationResult,
    EnrichObservationResult, EnrichSummaryResult, GenerateDigestResult,
};
