//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{ExtractorConfig, Extractor, ProcessState, Termination};
    use packsmith_domain::traits::LlmProvider;
    use packsmith_domain::{CardKind, CardPackage, CommunityCard, Severity};
    use packsmith_llm::{LlmError, MockProvider};
    use packsmith_validator::Validator;
    use proptest::prelude::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn reply(processed_up_to: usize) -> String {
        json!({"cards": [], "metadata": {"processedUpTo": processed_up_to}}).to_string()
    }

    fn extractor(provider: MockProvider) -> Extractor<MockProvider, Validator> {
        Extractor::with_default_validator(provider, ExtractorConfig::default())
    }

    fn positions(provider: &MockProvider) -> Vec<usize> {
        provider
            .prompts()
            .iter()
            .filter_map(|(_, user)| {
                let rest = user.split("Current position: ").nth(1)?;
                rest.split('.').next()?.parse().ok()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let provider = MockProvider::default();
        let mut context = CardPackage::named("Base");
        context.community.push(CommunityCard {
            id: Some("c1".into()),
            name: Some("Highborne".into()),
            ..Default::default()
        });

        let outcome = extractor(provider.clone())
            .process("", context.clone(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(outcome.data, context);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_short_input_single_iteration() {
        let provider = MockProvider::new(
            json!({
                "cards": [
                    {"type": "community", "id": "c1", "name": "Loreborne", "trait": "Well-read"},
                    {"type": "variant", "id": "v1", "name": "Longsword", "variantType": "Weapon"}
                ],
                "customFieldDefinitions": {"variantTypes": ["Weapon"]},
                "metadata": {"processedUpTo": 500},
                "name": "Armory"
            })
            .to_string(),
        );

        let outcome = extractor(provider.clone())
            .process(&"x".repeat(500), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcome.stats.total, 2);
        assert_eq!(outcome.stats.count(CardKind::Variant), 1);
        assert_eq!(outcome.data.name.as_deref(), Some("Armory"));
        assert_eq!(outcome.data.definitions("variantTypes"), ["Weapon"]);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_stalled_model_terminates_in_budget() {
        let provider = MockProvider::default();

        let outcome = extractor(provider.clone())
            .process(&"a".repeat(50_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.iterations, 50);
        assert_eq!(provider.call_count(), 50);
        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.position, 50_000);
        assert_eq!(positions(&provider)[..3], [0, 1_000, 2_000]);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_partial_result() {
        let provider = MockProvider::default();

        let outcome = extractor(provider.clone())
            .process(&"a".repeat(60_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Aborted);
        assert_eq!(outcome.iterations, 50);
        assert_eq!(outcome.position, 50_000);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.path == "import" && w.message.contains("stopped after 50 iterations")));
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_is_skipped() {
        let provider = MockProvider::new(reply(3_000));
        provider.push_error("HTTP 503: overloaded");

        let outcome = extractor(provider.clone())
            .process(&"b".repeat(3_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(positions(&provider), vec![0, 1_000]);

        let skip = &outcome.warnings[0];
        assert_eq!(skip.severity, Severity::Warning);
        assert_eq!(skip.path, "import.window[1]");
        assert!(skip.message.contains("HTTP 503: overloaded"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_skipped() {
        let provider = MockProvider::new(reply(2_500));
        provider.push_response("Here are your cards!");
        provider.push_response(r#"{"cards": "none", "metadata": {"processedUpTo": 10}}"#);

        let outcome = extractor(provider.clone())
            .process(&"c".repeat(2_500), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(positions(&provider), vec![0, 1_000, 2_000]);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_resume_offset_is_honoured() {
        let provider = MockProvider::new(reply(12_000));
        provider.push_response(
            json!({"cards": [], "metadata": {"processedUpTo": 6_000, "nextShouldStartFrom": 5_500}}).to_string(),
        );

        let outcome = extractor(provider.clone())
            .process(&"d".repeat(12_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(positions(&provider), vec![0, 5_500]);
        assert!(provider.prompts()[1].1.contains("characters 5300 to 11500"));
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_cards_merge_across_windows() {
        let provider = MockProvider::new(reply(0));
        provider.push_response(
            json!({
                "cards": [{"type": "domain", "id": "rune-ward", "name": "Rune Ward", "domain": "Arcana"}],
                "customFieldDefinitions": {"domains": ["Arcana"]},
                "metadata": {"processedUpTo": 6_000}
            })
            .to_string(),
        );
        provider.push_response(
            json!({
                "cards": [{"type": "domain", "id": "rune-ward", "level": 1, "recall": 0, "description": "Ward off harm."}],
                "customFieldDefinitions": {"domains": ["Arcana", "Blade"]},
                "metadata": {"processedUpTo": 8_000}
            })
            .to_string(),
        );

        let outcome = extractor(provider.clone())
            .process(&"e".repeat(8_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.data.domain.len(), 1);
        let card = &outcome.data.domain[0];
        assert_eq!(card.name.as_deref(), Some("Rune Ward"));
        assert_eq!(card.level, Some(1));
        assert_eq!(card.description.as_deref(), Some("Ward off harm."));
        assert_eq!(outcome.data.definitions("domains"), ["Arcana", "Blade"]);

        let second_prompt = &provider.prompts()[1].1;
        assert!(second_prompt.contains("domain 1"));
        assert!(second_prompt.contains("- domains: Arcana"));
    }

    #[tokio::test]
    async fn test_advisories_and_validation_surface() {
        let provider = MockProvider::new(
            json!({
                "cards": [
                    {"type": "ancestry", "id": "a1", "name": "Nimble", "lineage": "Faerie", "category": 1, "_note": "art missing"},
                    {"type": "ancestry", "id": "a2", "lineage": "Faerie", "category": 2}
                ],
                "metadata": {"processedUpTo": 100},
                "warnings": [{"severity": "info", "path": "ancestry", "message": "lineage split over two cards"}]
            })
            .to_string(),
        );

        let outcome = extractor(provider)
            .process(&"f".repeat(100), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert!(outcome.has_errors());
        assert_eq!(outcome.errors[0].path, "ancestry[1].name");
        assert!(outcome.warnings.iter().any(|w| w.message == "art missing" && w.path == "ancestry[0]"));
        assert!(outcome.warnings.iter().any(|w| w.message == "lineage split over two cards"));
        assert!(outcome.data.ancestry[0].extra.is_empty());
        assert!(outcome.data.pending_warnings.is_empty());
    }

    #[tokio::test]
    async fn test_progress_events() {
        let provider = MockProvider::new(reply(0));
        for offset in [6_000, 12_000, 15_000] {
            provider.push_response(reply(offset));
        }
        let events = RefCell::new(Vec::new());

        let outcome = extractor(provider)
            .process(&"g".repeat(15_000), CardPackage::new(), |state| {
                events.borrow_mut().push(state.clone());
            })
            .await
            .unwrap();

        let events = events.into_inner();
        let summary: Vec<(&str, f64)> = events.iter().map(|e| (e.phase(), e.progress())).collect();
        assert_eq!(
            summary,
            vec![
                ("parsing", 0.0),
                ("parsing", 36.0),
                ("parsing", 72.0),
                ("validating", 95.0),
                ("completed", 100.0)
            ]
        );

        match &events[1] {
            ProcessState::Parsing { chunk, total_chunks, .. } => {
                assert_eq!(*chunk, 2);
                assert_eq!(*total_chunks, 3);
            }
            other => panic!("unexpected state {:?}", other),
        }
        match events.last() {
            Some(ProcessState::Completed { stats, .. }) => assert_eq!(stats, &outcome.stats),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_stops_loop() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let provider = MockProvider::default().with_responder(move |_, _| {
            flag.store(true, Ordering::Relaxed);
            Ok(json!({
                "cards": [{"type": "variant", "id": "v1", "name": "Shield"}],
                "metadata": {"processedUpTo": 1_000}
            })
            .to_string())
        });

        let outcome = extractor(provider.clone())
            .with_cancel_flag(cancel)
            .process(&"h".repeat(5_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcome.position, 1_000);
        assert_eq!(outcome.data.variant.len(), 1);
        assert!(outcome.warnings.iter().any(|w| w.message.contains("cancelled")));
    }

    struct SlowProvider;

    impl LlmProvider for SlowProvider {
        type Error = LlmError;

        fn model_name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(reply(1_000))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_failed_call() {
        let extractor = Extractor::with_default_validator(SlowProvider, ExtractorConfig::default());
        let started = tokio::time::Instant::now();

        let outcome = extractor
            .process(&"i".repeat(1_000), CardPackage::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.position, 1_000);
        assert!(outcome.warnings[0].message.contains("timed out after 120s"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(120) && elapsed < Duration::from_secs(121));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_loop_terminates_and_advances(
            length in 0usize..20_000,
            replies in proptest::collection::vec(proptest::option::of(0usize..25_000), 0..40),
        ) {
            let provider = MockProvider::default();
            for reported in &replies {
                match reported {
                    Some(offset) => provider.push_response(reply(*offset)),
                    None => provider.push_error("transport failure"),
                }
            }
            let config = ExtractorConfig {
                window_size: 1_000,
                overlap: 100,
                fallback_skip: 300,
                max_iterations: 20,
                ..ExtractorConfig::default()
            };
            let extractor = Extractor::with_default_validator(provider.clone(), config);

            let runtime = tokio::runtime::Runtime::new().unwrap();
            let outcome = runtime
                .block_on(extractor.process(&"z".repeat(length), CardPackage::new(), |_| {}))
                .unwrap();

            prop_assert!(outcome.iterations <= 20);
            prop_assert_eq!(outcome.iterations, provider.call_count());

            let seen = positions(&provider);
            for pair in seen.windows(2) {
                prop_assert!(pair[0] < pair[1], "position went from {} to {}", pair[0], pair[1]);
            }

            match outcome.termination {
                Termination::Completed => prop_assert!(outcome.position >= length),
                Termination::Aborted => {
                    prop_assert_eq!(outcome.iterations, 20);
                    prop_assert!(outcome.position < length);
                }
                Termination::Cancelled => prop_assert!(false, "no cancel flag was set"),
            }
        }
    }
}
