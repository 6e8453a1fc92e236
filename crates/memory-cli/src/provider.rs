// crates/memory-cli/src/provider.rs
//! Builds the trait objects `memory-workers` needs from a loaded `Settings`
//! (spec §4.6/§6): which `AiProvider` backs enrichment/compression/digest
//! generation, and the one `EmbeddingProvider` this port ships.

use agentkits_memory_core::settings::{ProviderKind, Settings};
use agentkits_memory_providers::{AiProvider, EmbeddingProvider, HostedApiProvider, LocalCliProvider, LocalEmbeddingProvider};

/// Construct the configured `AiProvider`. `HostedB` shares `HostedApiProvider`
/// with `HostedA` — spec §9 leaves the two hosted kinds undifferentiated
/// beyond their `base_url`/`api_key`, so both map to the same HTTPS client.
pub fn build_ai_provider(settings: &Settings) -> Box<dyn AiProvider> {
    let Some(ai) = &settings.ai_provider else {
        return Box::new(LocalCliProvider::default());
    };

    match ai.provider {
        ProviderKind::Local => Box::new(LocalCliProvider::new("claude", ai.model.clone())),
        ProviderKind::HostedA | ProviderKind::HostedB => match (&ai.base_url, &ai.api_key) {
            (Some(base_url), Some(api_key)) => Box::new(HostedApiProvider::new(base_url.clone(), api_key.clone(), ai.model.clone())),
            _ => {
                tracing::warn!("hosted AI provider configured without baseUrl/apiKey, falling back to local CLI");
                Box::new(LocalCliProvider::default())
            }
        },
    }
}

pub fn build_embedding_provider() -> Box<dyn EmbeddingProvider> {
    Box::new(LocalEmbeddingProvider::default())
}
