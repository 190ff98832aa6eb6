//! Prompt assembly for chunked card extraction
//!
//! The system prompt is a constant ruleset. The user prompt carries the
//! window, its absolute offsets and, after the first window, a summary of
//! what has already been extracted.

use crate::chunking::Window;
use packsmith_domain::{CardKind, CardPackage};

/// Constant ruleset sent as the system prompt on every call
pub const SYSTEM_PROMPT: &str = r#"You convert tabletop RPG card text into a structured card package.

Card kinds and their fields:
- profession: id, name, description, domain1, domain2, startingHitPoints, startingEvasion, startingItems, hopeFeature, classFeature
- ancestry: id, name, lineage, category (1 or 2), description, effect
- community: id, name, trait, description
- subclass: id, name, mainClass, subclass, level (foundation | specialization | mastery), spellcastingTrait, description
- domain: id, name, domain, level (number), recall (number), attribute, description
- variant: id, name, variantType, subcategory, level, effect, description

Rules:
- Every card object carries a "type" field naming its kind
- Copy rules text faithfully; do not invent cards that are not in the text
- Reuse ids and names from earlier windows when a card continues across windows
- Record new domain names, profession names and variant types under customFieldDefinitions
- Put doubts about a card in a "_note" field on that card, or in the top-level "warnings" list
- Offsets are absolute character offsets into the whole document
- Reply with a single JSON object and nothing else"#;

const FORMAT_INSTRUCTIONS: &str = r#"Reply with exactly this JSON shape:
{
  "cards": [ { "type": "profession | ancestry | community | subclass | domain | variant", "id": "...", "name": "...", ... } ],
  "customFieldDefinitions": { "domains": ["..."], "professions": ["..."], "variantTypes": ["..."] },
  "metadata": {
    "processedUpTo": <absolute offset of the last character you fully processed>,
    "nextShouldStartFrom": <optional absolute offset to resume from, e.g. the start of a card cut off at the window end>,
    "confidence": "complete | partial"
  },
  "warnings": [ { "severity": "info | warning | error", "path": "...", "message": "..." } ]
}
"cards" must always be an array and "metadata.processedUpTo" must always be present."#;

const CONTINUATION_REMINDER: &str = r#"Continue with the same JSON shape as before. Only emit cards that start or continue in this window; "metadata.processedUpTo" is required."#;

/// Builds the user prompt for one window
pub struct PromptBuilder<'a> {
    window: &'a Window<'a>,
    position: usize,
    total_length: usize,
    is_first_chunk: bool,
    context: Option<&'a CardPackage>,
    preview_limit: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder for a window read at `position`
    pub fn new(window: &'a Window<'a>, position: usize, total_length: usize) -> Self {
        Self {
            window,
            position,
            total_length,
            is_first_chunk: true,
            context: None,
            preview_limit: 5,
        }
    }

    /// Mark the window as the first (full format instructions) or a later one
    pub fn first_chunk(mut self, is_first_chunk: bool) -> Self {
        self.is_first_chunk = is_first_chunk;
        self
    }

    /// Summarize the accumulated package on later windows
    pub fn with_context(mut self, context: &'a CardPackage) -> Self {
        self.context = Some(context);
        self
    }

    /// Definition values shown per category
    pub fn preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit;
        self
    }

    /// Build the user prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Where we are in the document
        prompt.push_str(&format!(
            "Document length: {} characters. Current position: {}.\n",
            self.total_length, self.position
        ));
        prompt.push_str(&format!(
            "This window covers characters {} to {}.\n\n",
            self.window.start_offset, self.window.end_offset
        ));

        // 2. Output contract
        if self.is_first_chunk {
            prompt.push_str(FORMAT_INSTRUCTIONS);
        } else {
            prompt.push_str(CONTINUATION_REMINDER);
        }
        prompt.push_str("\n\n");

        // 3. What is already known
        if !self.is_first_chunk {
            if let Some(context) = self.context {
                prompt.push_str(&self.context_summary(context));
            }
        }

        // 4. The text itself
        prompt.push_str("Text:\n---\n");
        prompt.push_str(self.window.text);
        prompt.push_str("\n---\n");

        prompt
    }

    fn context_summary(&self, context: &CardPackage) -> String {
        let mut summary = String::from("Already extracted:");
        for kind in CardKind::ALL {
            summary.push_str(&format!(" {} {},", kind, context.count(kind)));
        }
        summary.pop();
        summary.push('\n');

        if !context.custom_field_definitions.is_empty() {
            summary.push_str("Known definitions (reuse these, do not redefine):\n");
            for (category, values) in &context.custom_field_definitions {
                let shown: Vec<&str> = values
                    .iter()
                    .take(self.preview_limit)
                    .map(String::as_str)
                    .collect();
                summary.push_str(&format!("- {}: {}", category, shown.join(", ")));
                if values.len() > shown.len() {
                    summary.push_str(&format!(" (+{} more)", values.len() - shown.len()));
                }
                summary.push('\n');
            }
        }
        summary.push('\n');
        summary
    }
}
