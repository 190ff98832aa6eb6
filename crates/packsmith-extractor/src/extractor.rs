//! Core Extractor implementation: the batch orchestrator

use crate::chunking::{estimated_chunks, window, InputText};
use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, ModelCallError};
use crate::finalizer::finalize;
use crate::gateway::ModelGateway;
use crate::merger::merge;
use crate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::types::{ImportOutcome, ProcessState, Termination, UsageEstimate};
use packsmith_domain::traits::{LlmProvider, PackageValidator};
use packsmith_domain::{CardPackage, Diagnostic};
use packsmith_llm::PricingRate;
use packsmith_validator::Validator;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Share of the progress bar reserved for the ingestion loop
const PARSING_SHARE: f64 = 90.0;
const VALIDATING_PROGRESS: f64 = 95.0;
const COMPLETED_PROGRESS: f64 = 100.0;

/// Path used for run-level diagnostics
const RUN_PATH: &str = "import";

/// Mutable state of one `process()` call
struct ProgressState {
    position: usize,
    total_length: usize,
    iterations: usize,
    document: CardPackage,
}

/// The Extractor turns free-form card text into a card package by walking
/// the input window by window
pub struct Extractor<P, V> {
    gateway: ModelGateway<P>,
    validator: V,
    config: ExtractorConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<P> Extractor<P, Validator>
where
    P: LlmProvider,
    P::Error: Display,
{
    /// Create an Extractor with the default package validator
    pub fn with_default_validator(provider: P, config: ExtractorConfig) -> Self {
        Self::new(provider, Validator::default_config(), config)
    }
}

impl<P, V> Extractor<P, V>
where
    P: LlmProvider,
    P::Error: Display,
    V: PackageValidator,
{
    /// Create a new Extractor
    pub fn new(provider: P, validator: V, config: ExtractorConfig) -> Self {
        Self {
            gateway: ModelGateway::new(provider),
            validator,
            config,
            cancel: None,
        }
    }

    /// Stop the run at the next iteration once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Override the pricing used for cost estimates
    pub fn with_pricing(mut self, pricing: PricingRate) -> Self {
        self.gateway = self.gateway.with_pricing(pricing);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The model gateway
    pub fn gateway(&self) -> &ModelGateway<P> {
        &self.gateway
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run the ingestion loop over `input`, starting from `initial_context`.
    ///
    /// `on_progress` is called before every model call, when validation
    /// starts and when the run completes. Failed or stalled chunks are
    /// skipped and reported as warnings; running out of iterations or being
    /// cancelled still returns everything gathered so far.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if the configuration is invalid.
    pub async fn process<F>(
        &self,
        input: &str,
        initial_context: CardPackage,
        on_progress: F,
    ) -> Result<ImportOutcome, ExtractorError>
    where
        F: Fn(&ProcessState),
    {
        self.config.validate()?;

        let text = InputText::new(input);
        let total_chunks = estimated_chunks(text.len(), self.config.window_size);
        let policy = self.config.merge_policy();

        let mut state = ProgressState {
            position: 0,
            total_length: text.len(),
            iterations: 0,
            document: initial_context,
        };
        let mut warnings: Vec<Diagnostic> = Vec::new();
        let mut usage = UsageEstimate::default();

        info!(
            "Starting import: {} characters, ~{} windows, model {}",
            state.total_length,
            total_chunks,
            self.gateway.provider().model_name()
        );

        let termination = loop {
            // 1. Guards
            if state.position >= state.total_length {
                break Termination::Completed;
            }
            if state.iterations >= self.config.max_iterations {
                warn!(
                    "Iteration budget of {} exhausted at {}/{}",
                    self.config.max_iterations, state.position, state.total_length
                );
                warnings.push(Diagnostic::warning(
                    RUN_PATH,
                    format!(
                        "stopped after {} iterations at character {} of {}; the result is partial",
                        state.iterations, state.position, state.total_length
                    ),
                ));
                break Termination::Aborted;
            }
            if self.is_cancelled() {
                warn!("Import cancelled at {}/{}", state.position, state.total_length);
                warnings.push(Diagnostic::warning(
                    RUN_PATH,
                    format!(
                        "cancelled at character {} of {}; the result is partial",
                        state.position, state.total_length
                    ),
                ));
                break Termination::Cancelled;
            }

            // 2-4. Window and prompts
            state.iterations += 1;
            let current = window(&text, state.position, self.config.window_size, self.config.overlap);
            let user_prompt = PromptBuilder::new(&current, state.position, state.total_length)
                .first_chunk(state.iterations == 1)
                .with_context(&state.document)
                .preview_limit(self.config.definitions_preview_limit)
                .build();

            // 5. Progress
            on_progress(&ProcessState::Parsing {
                progress: state.position as f64 * PARSING_SHARE / state.total_length as f64,
                chunk: state.iterations,
                total_chunks,
                stats: state.document.stats(),
            });

            info!(
                "Window {} ({}..{} of {})",
                state.iterations, current.start_offset, current.end_offset, state.total_length
            );
            let input_tokens =
                self.gateway.estimate_tokens(SYSTEM_PROMPT) + self.gateway.estimate_tokens(&user_prompt);
            debug!("User prompt: {} chars, ~{} input tokens", user_prompt.len(), input_tokens);

            // 6. Model call
            let reply = match timeout(
                self.config.call_timeout(),
                self.gateway.generate(SYSTEM_PROMPT, &user_prompt),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ModelCallError::Timeout(self.config.call_timeout_secs)),
            };

            let reply = match reply {
                Ok(reply) => reply,
                Err(e) => {
                    usage.record(input_tokens, 0, self.gateway.estimate_cost(input_tokens, 0));
                    let skip_to = self.skip_from(state.position, state.total_length);
                    warn!(
                        "Model call for window {} failed: {}; skipping to {}",
                        state.iterations, e, skip_to
                    );
                    warnings.push(Diagnostic::warning(
                        format!("{}.window[{}]", RUN_PATH, state.iterations),
                        format!(
                            "model call failed at character {} ({}); skipped to {}",
                            state.position, e, skip_to
                        ),
                    ));
                    state.position = skip_to;
                    continue;
                }
            };

            usage.record(
                input_tokens,
                reply.output_tokens,
                self.gateway.estimate_cost(input_tokens, reply.output_tokens),
            );

            // 7. Merge
            let next = reply.response.metadata.resume_offset().min(state.total_length);
            let outcome = merge(&state.document, reply.response, policy);
            debug!(
                "Window {}: {} added, {} filled, {} dropped",
                state.iterations, outcome.stats.added, outcome.stats.filled, outcome.stats.dropped
            );
            state.document = outcome.package;
            warnings.extend(outcome.warnings);

            // 8. Advance, never backwards
            if next <= state.position {
                let skip_to = self.skip_from(state.position, state.total_length);
                warn!(
                    "Model did not advance past {} (reported {}); skipping to {}",
                    state.position, next, skip_to
                );
                warnings.push(Diagnostic::warning(
                    format!("{}.window[{}]", RUN_PATH, state.iterations),
                    format!(
                        "no progress reported at character {}; skipped to {}",
                        state.position, skip_to
                    ),
                ));
                state.position = skip_to;
            } else {
                state.position = next;
            }

            // 9. Done
            if state.position >= state.total_length {
                break Termination::Completed;
            }
        };

        // Finalize
        on_progress(&ProcessState::Validating {
            progress: VALIDATING_PROGRESS,
        });

        let finalized = finalize(state.document, &self.validator);
        warnings.extend(finalized.warnings);

        on_progress(&ProcessState::Completed {
            progress: COMPLETED_PROGRESS,
            stats: finalized.stats.clone(),
            warnings: warnings.clone(),
            errors: finalized.errors.clone(),
        });

        info!(
            "Import {:?} after {} iterations: {} cards, {} warnings, {} errors, ~${:.4}",
            termination,
            state.iterations,
            finalized.stats.total,
            warnings.len(),
            finalized.errors.len(),
            usage.estimated_cost
        );

        Ok(ImportOutcome {
            data: finalized.data,
            warnings,
            errors: finalized.errors,
            stats: finalized.stats,
            termination,
            iterations: state.iterations,
            position: state.position,
            total_length: state.total_length,
            usage,
        })
    }

    fn skip_from(&self, position: usize, total_length: usize) -> usize {
        position.saturating_add(self.config.fallback_skip).min(total_length)
    }
}
