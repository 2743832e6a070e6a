//! Anonymity set task abstraction

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::service::{AnonymityReport, AnonymitySetService};

/// Amounts of one transaction as supplied by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAmounts {
    /// Host identifier, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub inputs: Vec<i64>,
    pub outputs: Vec<i64>,
}

/// Single transaction analysis
#[derive(Debug, Clone)]
pub struct AnonymitySetTask {
    pub inputs: Vec<i64>,
    pub outputs: Vec<i64>,
}

impl AnonymitySetTask {
    pub fn new(inputs: Vec<i64>, outputs: Vec<i64>) -> Self {
        Self { inputs, outputs }
    }

    /// Execute the task on the given service
    pub async fn execute(
        self,
        service: &AnonymitySetService,
    ) -> Result<AnonymityReport, EngineError> {
        service.compute(&self.inputs, &self.outputs).await
    }
}

impl From<TransactionAmounts> for AnonymitySetTask {
    fn from(tx: TransactionAmounts) -> Self {
        Self::new(tx.inputs, tx.outputs)
    }
}

/// Batch analysis of several transactions against one service
#[derive(Debug, Clone, Default)]
pub struct BatchAnonymitySetTask {
    pub transactions: Vec<TransactionAmounts>,
}

impl BatchAnonymitySetTask {
    pub fn new(transactions: Vec<TransactionAmounts>) -> Self {
        Self { transactions }
    }

    /// Execute every transaction in order.
    ///
    /// Stops at the first failure and reports its position in the batch.
    pub async fn execute(
        self,
        service: &AnonymitySetService,
    ) -> Result<Vec<AnonymityReport>, EngineError> {
        let mut reports = Vec::with_capacity(self.transactions.len());

        for (index, tx) in self.transactions.into_iter().enumerate() {
            let report = service
                .compute(&tx.inputs, &tx.outputs)
                .await
                .map_err(|source| {
                    tracing::debug!(index, id = ?tx.id, "Batch transaction failed");
                    EngineError::BatchItem {
                        index,
                        source: Box::new(source),
                    }
                })?;
            reports.push(report);
        }

        Ok(reports)
    }
}
