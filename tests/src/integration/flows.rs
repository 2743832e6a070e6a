//! # Integration Test Flows
//!
//! Tests that the engine behaves the same way a host sees it, whichever
//! backend runs underneath.
//!
//! ## Flows Tested:
//!
//! 1. **Fixtures**: hand-checked transactions on every available backend
//! 2. **Determinism**: serial and parallel backends agree bit-for-bit
//! 3. **Host fallback**: oversized transactions fall back to the structural
//!    denomination profile, unavailable backends to another mode
//! 4. **Batches and metrics**: batch failures report their position

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anonset_engine::config::ExecutionMode;
    use anonset_engine::{
        available_modes, AmountSet, AnonymityScore, AnonymitySetService, AnonymitySetTask,
        BatchAnonymitySetTask, DenominationProfile, EngineConfig, EngineError, EngineMetrics,
        ErrorKind, ScorePolicy,
    };

    use crate::fixtures::{distinct_transaction, load_transactions, random_transaction};
    use crate::init_test_logging;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn service(mode: ExecutionMode, policy: ScorePolicy) -> AnonymitySetService {
        init_test_logging();
        let config = EngineConfig::default()
            .with_execution_mode(mode)
            .with_score_policy(policy);
        AnonymitySetService::new(config).expect("backend available")
    }

    /// Modes that can actually run here: the accelerator needs a device.
    fn runnable_modes() -> Vec<ExecutionMode> {
        available_modes()
            .into_iter()
            .filter(|mode| {
                AnonymitySetService::new(EngineConfig::default().with_execution_mode(*mode))
                    .is_ok()
            })
            .chain([
                ExecutionMode::MultiThreaded { workers: Some(1) },
                ExecutionMode::MultiThreaded { workers: Some(3) },
            ])
            .collect()
    }

    // =============================================================================
    // FIXTURES ON EVERY BACKEND
    // =============================================================================

    #[tokio::test]
    async fn test_fixture_minimums_on_every_backend() {
        for mode in runnable_modes() {
            let service = service(mode, ScorePolicy::Minimum);
            for fixture in load_transactions() {
                let report = service
                    .compute(&fixture.amounts.inputs, &fixture.amounts.outputs)
                    .await
                    .unwrap();
                assert_eq!(
                    report.score.minimum(),
                    Some(fixture.expected_minimum),
                    "fixture {:?} on {}",
                    fixture.amounts.id,
                    mode
                );
            }
        }
    }

    #[tokio::test]
    async fn test_fixture_batch() {
        let service = service(ExecutionMode::SingleThreaded, ScorePolicy::Minimum);
        let fixtures = load_transactions();
        let expected: Vec<Option<u64>> =
            fixtures.iter().map(|f| Some(f.expected_minimum)).collect();

        let batch =
            BatchAnonymitySetTask::new(fixtures.into_iter().map(|f| f.amounts).collect());
        let reports = batch.execute(&service).await.unwrap();

        let minima: Vec<Option<u64>> = reports.iter().map(|r| r.score.minimum()).collect();
        assert_eq!(minima, expected);
    }

    // =============================================================================
    // DETERMINISM ACROSS BACKENDS
    // =============================================================================

    #[tokio::test]
    async fn test_backends_agree_on_random_transactions() {
        let reference = service(ExecutionMode::SingleThreaded, ScorePolicy::PerOutput);
        let others: Vec<AnonymitySetService> = runnable_modes()
            .into_iter()
            .map(|mode| service(mode, ScorePolicy::PerOutput))
            .collect();

        for seed in 0..12u64 {
            let tx = random_transaction(seed, 14 + (seed as usize % 9), 4);
            let expected = reference.compute(&tx.inputs, &tx.outputs).await.unwrap();

            // Every output is a subset sum, so at least one subset matches
            match &expected.score {
                AnonymityScore::PerOutput { counts } => {
                    assert!(counts.iter().all(|m| m.count >= 1))
                }
                other => panic!("unexpected score {:?}", other),
            }

            for other in &others {
                let report = other.compute(&tx.inputs, &tx.outputs).await.unwrap();
                assert_eq!(report.score, expected.score, "seed {} on {}", seed, report.backend);
            }
        }
    }

    #[tokio::test]
    async fn test_sparse_domain_agrees() {
        // Amounts too large for the counting lane or the dense histogram
        let tx = distinct_transaction(99, 22);
        let serial = service(ExecutionMode::SingleThreaded, ScorePolicy::PerOutput)
            .compute(&tx.inputs, &tx.outputs)
            .await
            .unwrap();
        let parallel = service(
            ExecutionMode::MultiThreaded { workers: Some(4) },
            ScorePolicy::PerOutput,
        )
        .compute(&tx.inputs, &tx.outputs)
        .await
        .unwrap();

        assert_eq!(serial.score, parallel.score);
        match serial.score {
            // The full input set is always one match for the last output
            AnonymityScore::PerOutput { counts } => assert!(counts[2].count >= 1),
            other => panic!("unexpected score {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_normalized_score() {
        let service = service(
            ExecutionMode::MultiThreaded { workers: Some(2) },
            ScorePolicy::Normalized,
        );
        let report = service.compute(&[1, 2, 4, 8], &[15, 3]).await.unwrap();

        match report.score {
            AnonymityScore::Normalized {
                matches,
                minimum_ratio,
            } => {
                assert_eq!(matches[0].count, 1);
                assert_eq!(matches[0].total_subsets, 16);
                // {1, 2}
                assert_eq!(matches[1].count, 1);
                assert_eq!(minimum_ratio, 1.0 / 16.0);
            }
            other => panic!("unexpected score {:?}", other),
        }
    }

    // =============================================================================
    // HOST FALLBACK DECISIONS
    // =============================================================================

    #[tokio::test]
    async fn test_oversized_transaction_falls_back_to_denomination_profile() {
        init_test_logging();
        let config = EngineConfig::default()
            .with_execution_mode(ExecutionMode::SingleThreaded)
            .with_max_input_count(15);
        let service = AnonymitySetService::new(config).unwrap();

        let inputs: Vec<i64> = vec![100_000_000; 20];
        let outputs: Vec<i64> = [vec![100_000_000; 18], vec![49_970_000, 50_000_000]].concat();

        let err = service.compute(&inputs, &outputs).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeLimitExceeded);

        // Host-side estimate: the engine never substitutes it on its own
        let outputs = AmountSet::from_signed(anonset_engine::AmountSide::Outputs, &outputs).unwrap();
        let profile = DenominationProfile::from_outputs(&outputs).unwrap();
        assert_eq!(profile.denomination, 100_000_000);
        assert_eq!(profile.count, 18);
    }

    #[tokio::test]
    async fn test_host_retries_on_another_mode() {
        init_test_logging();
        let requested =
            EngineConfig::default().with_execution_mode(ExecutionMode::AcceleratorOffloaded);

        let service = match AnonymitySetService::new(requested.clone()) {
            Ok(service) => service,
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::ExecutionFailure);
                AnonymitySetService::new(
                    requested.with_execution_mode(ExecutionMode::MultiThreaded { workers: None }),
                )
                .unwrap()
            }
        };

        let report = service.compute(&[10, 20, 30], &[30]).await.unwrap();
        assert_eq!(report.score.minimum(), Some(2));
    }

    // =============================================================================
    // BATCHES AND METRICS
    // =============================================================================

    #[tokio::test]
    async fn test_batch_failure_position_and_metrics() {
        let metrics = Arc::new(EngineMetrics::new());
        let service = service(
            ExecutionMode::MultiThreaded { workers: Some(2) },
            ScorePolicy::Minimum,
        )
        .with_metrics(metrics.clone());

        let mut transactions: Vec<_> = (0..3).map(|seed| random_transaction(seed, 10, 2)).collect();
        transactions.push(anonset_engine::TransactionAmounts {
            id: Some("oversized".to_string()),
            inputs: vec![1; 31],
            outputs: vec![1],
        });
        transactions.push(random_transaction(50, 10, 2));

        let err = BatchAnonymitySetTask::new(transactions)
            .execute(&service)
            .await
            .unwrap_err();

        match err {
            EngineError::BatchItem { index, source } => {
                assert_eq!(index, 3);
                assert_eq!(*source, EngineError::SizeLimitExceeded { count: 31, max: 30 });
            }
            other => panic!("unexpected error {:?}", other),
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.invocations, 4);
        assert_eq!(snapshot.outputs_matched, 6);
        assert_eq!(metrics.failures_of(ErrorKind::SizeLimitExceeded), 1);
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let service = service(ExecutionMode::SingleThreaded, ScorePolicy::Minimum);
        let report = AnonymitySetTask::new(vec![5, 5, 10], vec![10, 20])
            .execute(&service)
            .await
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"]["policy"], "minimum");
        assert_eq!(json["score"]["count"], 1);
        assert_eq!(json["score"]["output_index"], 1);
        assert_eq!(json["policy"], "minimum");
        assert_eq!(json["total_subsets"], 8);
    }

    #[test]
    fn test_blocking_entry_point_matches_async() {
        init_test_logging();
        let config = EngineConfig::default();
        let score = anonset_engine::compute_anonymity_set(&[1, 2, 3, 4], &[5, 10], &config).unwrap();
        assert_eq!(
            score,
            AnonymityScore::Minimum {
                count: 1,
                output_index: 1
            }
        );
    }
}
