//! # Anonymity Set Service
//!
//! Orchestrates one invocation:
//!
//! 1. Validate (size limit, then amounts, then emptiness)
//! 2. Partition the inputs
//! 3. Enumerate both halves on the configured backend
//! 4. Match every output
//! 5. Aggregate under the configured policy
//!
//! Every call is independent; the service holds no state between calls
//! beyond its backend and metrics sink.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{
    total_subsets, AmountSet, AnonymityScore, Partition, ScoreAggregator, ScorePolicy,
};
use crate::error::{AmountSide, EngineError};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::{create_backend, Backend, ComputeEngine};

/// Result of one invocation, with enough context to interpret the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymityReport {
    pub score: AnonymityScore,
    pub policy: ScorePolicy,
    pub backend: Backend,
    pub input_count: usize,
    pub output_count: usize,
    /// `2^input_count`
    pub total_subsets: u64,
}

/// Entry point for anonymity set computation
pub struct AnonymitySetService {
    engine: Arc<dyn ComputeEngine>,
    config: EngineConfig,
    metrics: Arc<dyn MetricsRecorder>,
}

impl AnonymitySetService {
    /// Create a service on the backend named by `config.execution_mode`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = create_backend(&config)?;
        Ok(Self {
            engine,
            config,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Create a service on an explicit engine.
    pub fn with_engine(
        config: EngineConfig,
        engine: Arc<dyn ComputeEngine>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn ComputeEngine> {
        &self.engine
    }

    /// Compute the anonymity score for signed host amounts.
    pub async fn compute(
        &self,
        inputs: &[i64],
        outputs: &[i64],
    ) -> Result<AnonymityReport, EngineError> {
        self.metrics.record_invocation(inputs.len(), outputs.len());

        let result: Result<AnonymityReport, EngineError> = async {
            self.check_size(inputs.len())?;
            let inputs = AmountSet::from_signed(AmountSide::Inputs, inputs)?;
            let outputs = AmountSet::from_signed(AmountSide::Outputs, outputs)?;
            self.run(&inputs, &outputs).await
        }
        .await;

        self.observe(result)
    }

    /// Compute the anonymity score for already validated amount sets.
    ///
    /// Each set must be built for the side it is passed as.
    pub async fn compute_sets(
        &self,
        inputs: &AmountSet,
        outputs: &AmountSet,
    ) -> Result<AnonymityReport, EngineError> {
        self.metrics.record_invocation(inputs.len(), outputs.len());

        let result: Result<AnonymityReport, EngineError> = async {
            require_side(inputs, AmountSide::Inputs)?;
            require_side(outputs, AmountSide::Outputs)?;
            self.check_size(inputs.len())?;
            self.run(inputs, outputs).await
        }
        .await;

        self.observe(result)
    }

    fn check_size(&self, input_count: usize) -> Result<(), EngineError> {
        if input_count > self.config.max_input_count {
            return Err(EngineError::SizeLimitExceeded {
                count: input_count,
                max: self.config.max_input_count,
            });
        }
        Ok(())
    }

    async fn run(
        &self,
        inputs: &AmountSet,
        outputs: &AmountSet,
    ) -> Result<AnonymityReport, EngineError> {
        if self.config.reject_empty {
            inputs.require_non_empty()?;
            outputs.require_non_empty()?;
        }

        // The full-set total is the largest subset sum, including every
        // sum that combines both halves.
        inputs.total()?;

        let partition = Partition::split(inputs);

        let started = Instant::now();
        let (low, high) = futures::try_join!(
            self.engine.enumerate_sums(&partition.low),
            self.engine.enumerate_sums(&partition.high),
        )?;
        self.metrics
            .record_indexing(partition.subsets_indexed(), started.elapsed());

        let started = Instant::now();
        let counts = self.engine.count_matches(&low, &high, outputs).await?;
        self.metrics.record_matching(outputs.len(), started.elapsed());

        let policy = self.config.score_policy;
        let score = ScoreAggregator::new(policy).aggregate(counts, inputs.len())?;

        Ok(AnonymityReport {
            score,
            policy,
            backend: self.engine.backend(),
            input_count: inputs.len(),
            output_count: outputs.len(),
            total_subsets: total_subsets(inputs.len())?,
        })
    }

    fn observe(
        &self,
        result: Result<AnonymityReport, EngineError>,
    ) -> Result<AnonymityReport, EngineError> {
        match &result {
            Ok(report) => tracing::debug!(
                backend = %report.backend,
                inputs = report.input_count,
                outputs = report.output_count,
                policy = %report.policy,
                minimum = ?report.score.minimum(),
                "Anonymity set computed"
            ),
            Err(e) => {
                self.metrics.record_failure(e.kind());
                tracing::warn!(kind = ?e.kind(), error = %e, "Anonymity set computation failed");
            }
        }
        result
    }
}

fn require_side(set: &AmountSet, expected: AmountSide) -> Result<(), EngineError> {
    if set.side() != expected {
        return Err(EngineError::SideMismatch {
            expected,
            found: set.side(),
        });
    }
    Ok(())
}

/// Blocking convenience entry point.
///
/// Builds a backend from `config`, runs one invocation and returns the score.
pub fn compute_anonymity_set(
    inputs: &[i64],
    outputs: &[i64],
    config: &EngineConfig,
) -> Result<AnonymityScore, EngineError> {
    let service = AnonymitySetService::new(config.clone())?;
    futures::executor::block_on(service.compute(inputs, outputs)).map(|report| report.score)
}
