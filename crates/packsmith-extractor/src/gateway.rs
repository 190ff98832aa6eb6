//! Model gateway: one prompt pair in, one parsed chunk response out

use crate::error::ModelCallError;
use crate::parser::parse_chunk_response;
use crate::types::ChunkResponse;
use packsmith_domain::traits::LlmProvider;
use packsmith_llm::{estimate_tokens, PricingRate};
use std::fmt::Display;
use tracing::debug;

/// A parsed reply plus its size estimate
#[derive(Debug, Clone)]
pub struct GatewayReply {
    /// Parsed chunk response
    pub response: ChunkResponse,

    /// Estimated tokens in the raw reply
    pub output_tokens: usize,
}

/// Wraps an [`LlmProvider`] with response parsing and usage estimation.
///
/// There is no retry here; recovery is the orchestrator's decision.
#[derive(Debug, Clone)]
pub struct ModelGateway<P> {
    provider: P,
    pricing: PricingRate,
}

impl<P> ModelGateway<P>
where
    P: LlmProvider,
    P::Error: Display,
{
    /// Create a gateway priced for the provider's model
    pub fn new(provider: P) -> Self {
        let pricing = PricingRate::for_model(provider.model_name());
        Self { provider, pricing }
    }

    /// Override the pricing used for cost estimates
    pub fn with_pricing(mut self, pricing: PricingRate) -> Self {
        self.pricing = pricing;
        self
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Send the prompts and parse the reply
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<GatewayReply, ModelCallError> {
        let content = self
            .provider
            .generate(system_prompt, user_prompt)
            .await
            .map_err(|e| ModelCallError::Provider(e.to_string()))?;

        debug!("Model reply: {} chars", content.chars().count());

        let response = parse_chunk_response(&content)?;
        Ok(GatewayReply {
            response,
            output_tokens: self.estimate_tokens(&content),
        })
    }

    /// Heuristic token count (advisory)
    pub fn estimate_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }

    /// Linear cost estimate in USD (advisory)
    pub fn estimate_cost(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        self.pricing.estimate_cost(input_tokens, output_tokens)
    }
}
