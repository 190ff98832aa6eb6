//! Token and cost estimation
//!
//! Advisory numbers for telemetry; nothing in the pipeline makes control
//! decisions based on them.

use serde::{Deserialize, Serialize};

/// Estimate the token count of `text`.
///
/// CJK ideographs count half a token each, everything else a quarter; the
/// sum is rounded up.
///
/// # Examples
///
/// ```
/// use packsmith_llm::estimate_tokens;
///
/// assert_eq!(estimate_tokens(""), 0);
/// assert_eq!(estimate_tokens("abcd"), 1);
/// assert_eq!(estimate_tokens("火球"), 1);
/// assert_eq!(estimate_tokens("火球术"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> usize {
    let (cjk, other) = text.chars().fold((0usize, 0usize), |(cjk, other), c| {
        if is_cjk(c) {
            (cjk + 1, other)
        } else {
            (cjk, other + 1)
        }
    });
    // cjk/2 + other/4 == (2*cjk + other)/4
    (2 * cjk + other).div_ceil(4)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}' // Extension A
        | '\u{F900}'..='\u{FAFF}' // Compatibility Ideographs
    )
}

/// Linear price per thousand tokens (USD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRate {
    /// Price per 1k prompt tokens
    pub prompt_per_1k: f64,

    /// Price per 1k completion tokens
    pub completion_per_1k: f64,
}

impl PricingRate {
    /// Rate used when a model is not in the built-in table
    pub const FALLBACK: PricingRate = PricingRate {
        prompt_per_1k: 0.0005,
        completion_per_1k: 0.0015,
    };

    /// Look up the built-in rate for a model name
    pub fn for_model(model: &str) -> Self {
        let model = model.to_lowercase();
        let model = model.rsplit('/').next().unwrap_or(&model);

        let (prompt_per_1k, completion_per_1k) = match model {
            m if m.starts_with("gpt-4o-mini") => (0.000_15, 0.000_6),
            m if m.starts_with("gpt-4o") => (0.002_5, 0.01),
            m if m.starts_with("gpt-4.1-mini") => (0.000_4, 0.001_6),
            m if m.starts_with("gpt-4.1") => (0.002, 0.008),
            m if m.starts_with("deepseek-chat") => (0.000_27, 0.001_1),
            m if m.starts_with("deepseek-reasoner") => (0.000_55, 0.002_19),
            _ => return Self::FALLBACK,
        };

        Self {
            prompt_per_1k,
            completion_per_1k,
        }
    }

    /// Estimated cost of one call
    pub fn estimate_cost(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        input_tokens as f64 / 1000.0 * self.prompt_per_1k
            + output_tokens as f64 / 1000.0 * self.completion_per_1k
    }
}
