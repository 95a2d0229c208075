use sea_orm::TransactionTrait;

use crate::{CreateTransactionCmd, ResultEngine, SeriesPlan, util::normalize_optional_text};

use super::super::{Engine, with_tx};
use super::{CreatedTransactions, RecordTemplate};

impl Engine {
    /// Records a transaction request.
    ///
    /// Depending on `cmd.repetition` this persists one record, an
    /// installment plan or a recurring expansion. In every case exactly one
    /// ledger effect is applied, and either all records plus that effect are
    /// committed or none are.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultEngine<CreatedTransactions> {
        let plan = SeriesPlan::new(
            cmd.amount,
            cmd.direction,
            cmd.payment_method,
            cmd.occurred_on,
            cmd.repetition,
            cmd.source,
        )?;
        let note = normalize_optional_text(cmd.note.as_deref());
        let owner_id = cmd.owner_id.as_str();

        let created = with_tx!(self, |db_tx| {
            self.require_wallet_owned(&db_tx, owner_id, cmd.wallet_id)
                .await?;
            let category_id = self
                .resolve_category(&db_tx, owner_id, cmd.category_id)
                .await?;
            let template = RecordTemplate {
                wallet_id: cmd.wallet_id,
                category_id,
                direction: cmd.direction,
                payment_method: cmd.payment_method,
                source: cmd.source,
                note: note.as_deref(),
            };
            self.persist_plan(&db_tx, &plan, &template).await
        })?;

        match created.series_id {
            Some(series_id) => tracing::info!(
                %series_id,
                wallet_id = %cmd.wallet_id,
                records = created.records.len(),
                effect = ?created.effect,
                "series created"
            ),
            None => tracing::debug!(
                wallet_id = %cmd.wallet_id,
                effect = ?created.effect,
                "transaction created"
            ),
        }
        Ok(created)
    }
}
