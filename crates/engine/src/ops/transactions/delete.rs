use uuid::Uuid;

use sea_orm::TransactionTrait;

use crate::{ResultEngine, Transaction};

use super::super::{Engine, with_tx};
use super::DeletedTransactions;

impl Engine {
    /// Deletes a transaction, or its whole series when it belongs to one.
    ///
    /// Exactly one ledger effect is reversed, whatever the series size. A
    /// deferred-payment expense never touched the ledger, so nothing is
    /// reversed for it.
    pub async fn delete_transaction(
        &self,
        owner_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<DeletedTransactions> {
        let deleted = with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, owner_id, transaction_id)
                .await?;
            let current = Transaction::try_from(model)?;
            self.remove_transaction(&db_tx, &current).await
        })?;

        tracing::info!(
            %transaction_id,
            deleted = deleted.deleted.len(),
            reversed = ?deleted.reversed,
            "transaction deleted"
        );
        Ok(deleted)
    }
}
