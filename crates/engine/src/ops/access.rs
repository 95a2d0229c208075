use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, subscriptions, transactions, wallets};

use super::Engine;

/// Generates a `require_*_owned` lookup for an entity carrying an
/// `owner_id` column. A row owned by someone else reads as missing.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $owner_col:expr, $model:ty, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            owner_id: &str,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .filter($owner_col.eq(owner_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_wallet_owned,
        wallets::Entity,
        wallets::Column::OwnerId,
        wallets::Model,
        "wallet not exists"
    );

    impl_require_owned!(
        require_category_owned,
        categories::Entity,
        categories::Column::OwnerId,
        categories::Model,
        "category not exists"
    );

    impl_require_owned!(
        require_subscription_owned,
        subscriptions::Entity,
        subscriptions::Column::OwnerId,
        subscriptions::Model,
        "subscription not exists"
    );

    /// Transactions are owned through their wallet.
    pub(super) async fn require_transaction_owned(
        &self,
        db: &DatabaseTransaction,
        owner_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        let found = transactions::Entity::find_by_id(transaction_id)
            .find_also_related(wallets::Entity)
            .one(db)
            .await?;
        match found {
            Some((model, Some(wallet))) if wallet.owner_id == owner_id => Ok(model),
            _ => Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            )),
        }
    }
}
