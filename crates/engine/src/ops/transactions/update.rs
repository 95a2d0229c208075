use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{
    LedgerEffect, ResultEngine, Transaction, UpdateTransactionCmd, transactions,
    util::normalize_optional_text,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Updates an existing transaction and returns the records it touched.
    ///
    /// If the change alters the ledger effect (amount, direction, wallet or
    /// payment method), the stored effect is reversed first and the new one
    /// applied after, so the new debit is checked against the post-reversal
    /// balance. A series member carries the series' single effect: the patch
    /// is written to every member but only one effect is reversed and
    /// re-applied. The date patch only moves the targeted record.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Vec<Transaction>> {
        if let Some(amount) = cmd.amount {
            amount.ensure_positive("amount")?;
        }
        let owner_id = cmd.owner_id.as_str();
        let transaction_id = cmd.transaction_id;

        let updated = with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, owner_id, transaction_id)
                .await?;
            let current = Transaction::try_from(model)?;

            let amount = cmd.amount.unwrap_or(current.amount);
            let direction = cmd.direction.unwrap_or(current.direction);
            let payment_method = cmd.payment_method.unwrap_or(current.payment_method);
            let wallet_id = cmd.wallet_id.unwrap_or(current.wallet_id);
            if wallet_id != current.wallet_id {
                self.require_wallet_owned(&db_tx, owner_id, wallet_id)
                    .await?;
            }
            let category_id = match cmd.category_id {
                Some(category_id) => {
                    self.require_category_owned(&db_tx, owner_id, category_id)
                        .await?;
                    category_id
                }
                None => current.category_id,
            };
            let note = match cmd.note.as_deref() {
                Some(text) => normalize_optional_text(Some(text)),
                None => current.note.clone(),
            };

            let old_effect =
                LedgerEffect::of(current.direction, current.payment_method, current.amount);
            let new_effect = LedgerEffect::of(direction, payment_method, amount);
            if (old_effect, current.wallet_id) != (new_effect, wallet_id) {
                old_effect.inverse().apply(&db_tx, current.wallet_id).await?;
                new_effect.apply(&db_tx, wallet_id).await?;
            }

            let patch = transactions::ActiveModel {
                amount_minor: ActiveValue::Set(amount.cents()),
                direction: ActiveValue::Set(direction.as_str().to_string()),
                wallet_id: ActiveValue::Set(wallet_id),
                payment_method: ActiveValue::Set(payment_method.as_str().to_string()),
                category_id: ActiveValue::Set(category_id),
                note: ActiveValue::Set(note),
                ..Default::default()
            };
            let scope = match current.series.series_id() {
                Some(series_id) => transactions::Column::SeriesId.eq(series_id),
                None => transactions::Column::Id.eq(current.id),
            };
            transactions::Entity::update_many()
                .set(patch)
                .filter(scope.clone())
                .exec(&db_tx)
                .await?;

            if let Some(occurred_on) = cmd.occurred_on {
                transactions::Entity::update_many()
                    .col_expr(transactions::Column::OccurredOn, Expr::value(occurred_on))
                    .filter(transactions::Column::Id.eq(current.id))
                    .exec(&db_tx)
                    .await?;
            }

            let models = transactions::Entity::find()
                .filter(scope)
                .order_by_asc(transactions::Column::SeriesPosition)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })?;

        tracing::info!(
            %transaction_id,
            records = updated.len(),
            "transaction updated"
        );
        Ok(updated)
    }
}
