use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    Direction, EngineError, Money, Repetition, ResultEngine, SeriesPlan, Subscription,
    SubscriptionStatus, TransactionSource, subscriptions,
};

use super::{Engine, transactions::RecordTemplate, with_tx};

/// Upper bound on periods billed for one subscription in a single trigger.
const MAX_PERIODS_PER_TRIGGER: usize = 1_000;

/// How many overdue periods one trigger bills per subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUp {
    /// One period per trigger; an overdue subscription needs several
    /// triggers to catch up.
    #[default]
    OnePeriod,
    /// Every overdue period, until `next_billing_date` is after today.
    AllDue,
}

impl CatchUp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnePeriod => "one_period",
            Self::AllDue => "all_due",
        }
    }
}

impl TryFrom<&str> for CatchUp {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "one_period" => Ok(Self::OnePeriod),
            "all_due" => Ok(Self::AllDue),
            other => Err(EngineError::InvalidArgument(format!(
                "invalid catch-up policy: {other}"
            ))),
        }
    }
}

/// One billed period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BilledPeriod {
    pub subscription_id: Uuid,
    pub name: String,
    pub transaction_id: Uuid,
    pub direction: Direction,
    pub amount: Money,
    pub billed_on: NaiveDate,
    pub next_billing_date: NaiveDate,
}

impl fmt::Display for BilledPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} on {}, next billing {}",
            self.name,
            self.direction.as_str(),
            self.amount,
            self.billed_on,
            self.next_billing_date
        )
    }
}

/// A subscription that could not be billed. Its date was not advanced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BillingFailure {
    pub subscription_id: Uuid,
    pub name: String,
    pub code: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    /// Subscriptions with at least one billed period.
    pub processed: usize,
    pub details: Vec<BilledPeriod>,
    pub failures: Vec<BillingFailure>,
}

impl Engine {
    /// Bills every active subscription due on or before `today`.
    ///
    /// Each period is its own atomic unit: the generated transaction, its
    /// ledger effect and the date advance commit together or not at all.
    /// The advance is a compare-and-set on the previous date, so a period
    /// billed by a concurrent trigger is skipped instead of billed twice.
    /// A failing subscription is reported and does not stop the others.
    pub async fn trigger_subscription_billing(
        &self,
        today: NaiveDate,
    ) -> ResultEngine<BillingSummary> {
        let due = with_tx!(self, |db_tx| {
            let models = subscriptions::Entity::find()
                .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active.as_str()))
                .filter(subscriptions::Column::NextBillingDate.lte(today))
                .order_by_asc(subscriptions::Column::NextBillingDate)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Subscription::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })?;

        let mut summary = BillingSummary::default();
        for mut subscription in due {
            let mut billed = 0;
            while billed < MAX_PERIODS_PER_TRIGGER {
                match self.bill_period(&subscription).await {
                    Ok(Some(period)) => {
                        subscription.next_billing_date = period.next_billing_date;
                        summary.details.push(period);
                        billed += 1;
                    }
                    Ok(None) => {
                        tracing::debug!(
                            subscription_id = %subscription.id,
                            "period already billed elsewhere"
                        );
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(
                            subscription_id = %subscription.id,
                            code = err.code(),
                            error = %err,
                            "subscription billing failed"
                        );
                        summary.failures.push(BillingFailure {
                            subscription_id: subscription.id,
                            name: subscription.name.clone(),
                            code: err.code().to_string(),
                            error: err.to_string(),
                        });
                        break;
                    }
                }
                if self.catch_up == CatchUp::OnePeriod || !subscription.is_due(today) {
                    break;
                }
            }
            if billed > 0 {
                summary.processed += 1;
            }
        }

        tracing::info!(
            %today,
            processed = summary.processed,
            periods = summary.details.len(),
            failures = summary.failures.len(),
            catch_up = self.catch_up.as_str(),
            "billing run finished"
        );
        Ok(summary)
    }

    /// Bills the period starting at `subscription.next_billing_date`.
    ///
    /// Returns `None` when the stored date no longer matches, meaning the
    /// period was billed (or the subscription paused) in the meantime.
    async fn bill_period(&self, subscription: &Subscription) -> ResultEngine<Option<BilledPeriod>> {
        let billed_on = subscription.next_billing_date;
        let next_billing_date = subscription.frequency.advance(billed_on)?;
        let source = TransactionSource::Subscription {
            subscription_id: subscription.id,
        };
        let plan = SeriesPlan::new(
            subscription.amount,
            subscription.direction,
            subscription.payment_method,
            billed_on,
            Repetition::Once,
            source,
        )?;

        with_tx!(self, |db_tx| {
            let advanced = subscriptions::Entity::update_many()
                .col_expr(
                    subscriptions::Column::NextBillingDate,
                    Expr::value(next_billing_date),
                )
                .filter(subscriptions::Column::Id.eq(subscription.id))
                .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active.as_str()))
                .filter(subscriptions::Column::NextBillingDate.eq(billed_on))
                .exec(&db_tx)
                .await?;
            if advanced.rows_affected == 0 {
                return Ok(None);
            }

            let template = RecordTemplate {
                wallet_id: subscription.wallet_id,
                category_id: subscription.category_id,
                direction: subscription.direction,
                payment_method: subscription.payment_method,
                source,
                note: Some(subscription.name.as_str()),
            };
            let created = self.persist_plan(&db_tx, &plan, &template).await?;
            let Some(record) = created.records.first() else {
                return Err(EngineError::InvalidArgument(
                    "billing planned no transaction".to_string(),
                ));
            };

            tracing::info!(
                subscription_id = %subscription.id,
                transaction_id = %record.id,
                %billed_on,
                %next_billing_date,
                "subscription billed"
            );
            Ok(Some(BilledPeriod {
                subscription_id: subscription.id,
                name: subscription.name.clone(),
                transaction_id: record.id,
                direction: subscription.direction,
                amount: subscription.amount,
                billed_on,
                next_billing_date,
            }))
        })
    }
}
