use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Direction, EngineError, LedgerEffect, PaymentMethod, ResultEngine, SeriesPlan, Transaction,
    TransactionSource, transactions,
};

use super::{Engine, with_tx};

mod create;
mod delete;
mod update;

/// Result of `create_transaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTransactions {
    /// Shared id of the records, `None` for a one-off.
    pub series_id: Option<Uuid>,
    /// Created records, in series order.
    pub records: Vec<Transaction>,
    /// The single effect applied to the wallet.
    pub effect: LedgerEffect,
}

/// Result of `delete_transaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTransactions {
    pub deleted: Vec<Uuid>,
    /// The effect applied to undo the deleted records.
    pub reversed: LedgerEffect,
}

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`).
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only members of this series.
    pub series_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidArgument(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

/// Fields shared by every record of a plan.
pub(super) struct RecordTemplate<'a> {
    pub(super) wallet_id: Uuid,
    pub(super) category_id: Uuid,
    pub(super) direction: Direction,
    pub(super) payment_method: PaymentMethod,
    pub(super) source: TransactionSource,
    pub(super) note: Option<&'a str>,
}

impl Engine {
    /// Applies the plan's ledger effect and inserts its records.
    ///
    /// Must run inside the caller's DB transaction: a failed debit or insert
    /// rolls the whole plan back.
    pub(super) async fn persist_plan(
        &self,
        db_tx: &DatabaseTransaction,
        plan: &SeriesPlan,
        template: &RecordTemplate<'_>,
    ) -> ResultEngine<CreatedTransactions> {
        plan.effect.apply(db_tx, template.wallet_id).await?;

        let created_at = Utc::now();
        let records: Vec<Transaction> = plan
            .records
            .iter()
            .map(|planned| Transaction {
                id: Uuid::new_v4(),
                wallet_id: template.wallet_id,
                amount: planned.amount,
                direction: template.direction,
                occurred_on: planned.occurred_on,
                category_id: template.category_id,
                payment_method: template.payment_method,
                series: planned.series,
                source: template.source,
                note: template.note.map(ToString::to_string),
                created_at,
            })
            .collect();

        let rows = records
            .iter()
            .map(transactions::ActiveModel::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        transactions::Entity::insert_many(rows)
            .exec_without_returning(db_tx)
            .await?;

        Ok(CreatedTransactions {
            series_id: plan.series_id,
            records,
            effect: plan.effect,
        })
    }

    /// Reverses the record's ledger effect once and deletes it, together
    /// with every other member of its series.
    pub(super) async fn remove_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<DeletedTransactions> {
        let reversed = LedgerEffect::of(tx.direction, tx.payment_method, tx.amount).inverse();
        reversed.apply(db_tx, tx.wallet_id).await?;

        let deleted = match tx.series.series_id() {
            Some(series_id) => {
                let ids = Self::series_members(db_tx, series_id)
                    .await?
                    .into_iter()
                    .map(|model| model.id)
                    .collect();
                transactions::Entity::delete_many()
                    .filter(transactions::Column::SeriesId.eq(series_id))
                    .exec(db_tx)
                    .await?;
                ids
            }
            None => {
                transactions::Entity::delete_by_id(tx.id)
                    .exec(db_tx)
                    .await?;
                vec![tx.id]
            }
        };

        Ok(DeletedTransactions { deleted, reversed })
    }

    async fn series_members(
        db_tx: &DatabaseTransaction,
        series_id: Uuid,
    ) -> ResultEngine<Vec<transactions::Model>> {
        transactions::Entity::find()
            .filter(transactions::Column::SeriesId.eq(series_id))
            .order_by_asc(transactions::Column::SeriesPosition)
            .all(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Returns a transaction owned (through its wallet) by `owner_id`.
    pub async fn transaction(
        &self,
        owner_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, owner_id, transaction_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// Lists a wallet's transactions, newest first.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        wallet_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            self.require_wallet_owned(&db_tx, owner_id, wallet_id)
                .await?;

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::WalletId.eq(wallet_id));
            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::OccurredOn.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::OccurredOn.lt(to));
            }
            if let Some(series_id) = filter.series_id {
                query = query.filter(transactions::Column::SeriesId.eq(series_id));
            }

            let models = query
                .order_by_desc(transactions::Column::OccurredOn)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::SeriesPosition)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }
}
