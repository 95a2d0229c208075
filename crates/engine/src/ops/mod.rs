use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod billing;
mod budgets;
mod categories;
mod subscriptions;
mod transactions;
mod wallets;

pub use billing::{BilledPeriod, BillingFailure, BillingSummary, CatchUp};
pub use subscriptions::DeletedSubscription;
pub use transactions::{CreatedTransactions, DeletedTransactions, TransactionListFilter};

/// Run a block inside a DB transaction, committing on success and rolling
/// back on error.
///
/// A transient `Conflict` rolls the attempt back and reruns the whole block
/// after an exponential backoff, up to `RetryPolicy::max_attempts` times. The
/// block may run more than once, so it must not move captured values. An
/// early `return` leaves the attempt without committing.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut attempt: u32 = 1;
        loop {
            let outcome = async {
                let $tx = $self.database.begin().await?;
                let result: Result<_, $crate::EngineError> = $body;
                let value = result?;
                $tx.commit().await?;
                Ok::<_, $crate::EngineError>(value)
            }
            .await;
            match outcome {
                Err(err) if err.is_transient() && attempt < $self.retry.max_attempts => {
                    let delay = $self.retry.backoff(attempt);
                    tracing::warn!(attempt, ?delay, error = %err, "transient conflict, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => break other,
            }
        }
    }};
}

pub(crate) use with_tx;

/// Bounded retry of transient store conflicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    retry: RetryPolicy,
    catch_up: CatchUp,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn catch_up(&self) -> CatchUp {
        self.catch_up
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    retry: RetryPolicy,
    catch_up: CatchUp,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the retry policy for transient conflicts.
    pub fn retry(mut self, retry: RetryPolicy) -> EngineBuilder {
        self.retry = retry;
        self
    }

    /// How many overdue periods one billing trigger processes.
    pub fn catch_up(mut self, catch_up: CatchUp) -> EngineBuilder {
        self.catch_up = catch_up;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.retry.max_attempts == 0 {
            return Err(crate::EngineError::InvalidArgument(
                "retry max_attempts must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            retry: self.retry,
            catch_up: self.catch_up,
        })
    }
}
