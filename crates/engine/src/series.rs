//! Series planning.
//!
//! Turns one transaction request into the records to persist and the single
//! ledger effect to apply. Planning is pure: nothing here touches the
//! database, so the decision can be tested on its own.
//!
//! Rules, evaluated in order:
//!
//! 1. `Installments(n)` with `n > 1`: the total is split into `n` equal
//!    rounded shares dated one calendar month apart. Only the first share
//!    reaches the ledger.
//! 2. `Recurring(frequency)` for a user request: [`SUBSCRIPTION_HORIZON`]
//!    records of the full amount, one period apart. The ledger sees one
//!    period.
//! 3. Anything else, including every subscription-sourced request: one
//!    standalone record for the full amount.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    Direction, EngineError, LedgerEffect, Money, PaymentMethod, ResultEngine, Series,
    TransactionSource, calendar::monthly_series, subscriptions::Frequency,
};

/// Upper bound on installment plans (ten years of monthly payments).
pub const MAX_INSTALLMENTS: u32 = 120;

/// Number of records generated for a recurring request.
pub const SUBSCRIPTION_HORIZON: u32 = 12;

/// How a request repeats over time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repetition {
    #[default]
    Once,
    /// Split the amount into this many monthly installments.
    Installments(u32),
    /// Repeat the full amount every period.
    Recurring(Frequency),
}

/// A record the plan asks to persist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedRecord {
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub series: Series,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesPlan {
    pub series_id: Option<Uuid>,
    pub records: Vec<PlannedRecord>,
    pub effect: LedgerEffect,
}

impl SeriesPlan {
    /// Plans a request.
    ///
    /// Fails with `InvalidArgument` for a non-positive amount, an installment
    /// count of 0 or above [`MAX_INSTALLMENTS`], or a share that rounds to
    /// zero cents.
    pub fn new(
        amount: Money,
        direction: Direction,
        method: PaymentMethod,
        occurred_on: NaiveDate,
        repetition: Repetition,
        source: TransactionSource,
    ) -> ResultEngine<Self> {
        amount.ensure_positive("amount")?;

        match repetition {
            Repetition::Installments(0) => Err(EngineError::InvalidArgument(
                "installment count must be > 0".to_string(),
            )),
            Repetition::Installments(count) if count > MAX_INSTALLMENTS => {
                Err(EngineError::InvalidArgument(format!(
                    "installment count must be <= {MAX_INSTALLMENTS}"
                )))
            }
            Repetition::Installments(count) if count > 1 => {
                Self::installments(amount, direction, method, occurred_on, count)
            }
            Repetition::Recurring(frequency) if source == TransactionSource::User => {
                Self::recurring(amount, direction, method, occurred_on, frequency)
            }
            _ => Ok(Self::one_off(amount, direction, method, occurred_on)),
        }
    }

    fn one_off(
        amount: Money,
        direction: Direction,
        method: PaymentMethod,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            series_id: None,
            records: vec![PlannedRecord {
                amount,
                occurred_on,
                series: Series::Standalone,
            }],
            effect: LedgerEffect::of(direction, method, amount),
        }
    }

    fn installments(
        total: Money,
        direction: Direction,
        method: PaymentMethod,
        start: NaiveDate,
        count: u32,
    ) -> ResultEngine<Self> {
        let share = total.share(count)?;
        if share.is_zero() {
            return Err(EngineError::InvalidArgument(format!(
                "{total} split in {count} installments rounds to zero"
            )));
        }

        let series_id = Uuid::new_v4();
        let records = monthly_series(start, count)?
            .into_iter()
            .zip(1..)
            .map(|(occurred_on, position)| PlannedRecord {
                amount: share,
                occurred_on,
                series: Series::Installment {
                    series_id,
                    position,
                    total: count,
                },
            })
            .collect();

        Ok(Self {
            series_id: Some(series_id),
            records,
            effect: LedgerEffect::of(direction, method, share),
        })
    }

    fn recurring(
        amount: Money,
        direction: Direction,
        method: PaymentMethod,
        start: NaiveDate,
        frequency: Frequency,
    ) -> ResultEngine<Self> {
        let series_id = Uuid::new_v4();
        let records = (0..SUBSCRIPTION_HORIZON)
            .map(|index| {
                Ok(PlannedRecord {
                    amount,
                    occurred_on: frequency.nth_after(start, index)?,
                    series: Series::SubscriptionExpansion {
                        series_id,
                        position: index + 1,
                    },
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Self {
            series_id: Some(series_id),
            records,
            effect: LedgerEffect::of(direction, method, amount),
        })
    }

    /// Sum of all planned amounts.
    pub fn total(&self) -> Money {
        self.records.iter().map(|record| record.amount).sum()
    }
}
