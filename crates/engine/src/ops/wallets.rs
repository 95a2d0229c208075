use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Direction, EngineError, Money, PaymentMethod, Repetition, ResultEngine, SeriesPlan,
    TransactionSource, Wallet, util::normalize_required_name, wallets,
};

use super::{Engine, transactions::RecordTemplate, with_tx};

const OPENING_BALANCE_NOTE: &str = "Opening balance";

impl Engine {
    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, owner_id: &str, wallet_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_wallet_owned(&db_tx, owner_id, wallet_id)
                .await?;
            Ok(Wallet::from(model))
        })
    }

    /// Lists the owner's wallets by name.
    pub async fn wallets(&self, owner_id: &str) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            let models = wallets::Entity::find()
                .filter(wallets::Column::OwnerId.eq(owner_id.to_string()))
                .order_by_asc(wallets::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Wallet::from).collect())
        })
    }

    /// Add a new wallet.
    ///
    /// The wallet is created with a zero balance. A positive
    /// `opening_balance` is then recorded as a cash income dated today, so
    /// the balance always equals the sum of the wallet's ledger effects.
    pub async fn new_wallet(
        &self,
        owner_id: &str,
        name: &str,
        opening_balance: Money,
        closing_day: Option<u8>,
        due_day: Option<u8>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "wallet")?;
        if opening_balance < Money::ZERO {
            return Err(EngineError::InvalidArgument(
                "opening balance must be >= 0".to_string(),
            ));
        }
        let wallet = Wallet::new(owner_id.to_string(), name, closing_day, due_day)?;
        let opening = if opening_balance.is_positive() {
            Some(SeriesPlan::new(
                opening_balance,
                Direction::Income,
                PaymentMethod::Cash,
                Utc::now().date_naive(),
                Repetition::Once,
                TransactionSource::User,
            )?)
        } else {
            None
        };

        with_tx!(self, |db_tx| {
            let exists = wallets::Entity::find()
                .filter(wallets::Column::OwnerId.eq(owner_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(wallet.name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::AlreadyExists(wallet.name.clone()));
            }

            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            if let Some(plan) = &opening {
                let category_id = self.resolve_category(&db_tx, owner_id, None).await?;
                let template = RecordTemplate {
                    wallet_id: wallet.id,
                    category_id,
                    direction: Direction::Income,
                    payment_method: PaymentMethod::Cash,
                    source: TransactionSource::User,
                    note: Some(OPENING_BALANCE_NOTE),
                };
                self.persist_plan(&db_tx, plan, &template).await?;
            }

            tracing::info!(wallet_id = %wallet.id, %opening_balance, "wallet created");
            Ok(wallet.id)
        })
    }

    /// Renames an existing wallet.
    pub async fn rename_wallet(
        &self,
        owner_id: &str,
        wallet_id: Uuid,
        new_name: &str,
    ) -> ResultEngine<()> {
        let new_name = normalize_required_name(new_name, "wallet")?;
        with_tx!(self, |db_tx| {
            self.require_wallet_owned(&db_tx, owner_id, wallet_id)
                .await?;

            let exists = wallets::Entity::find()
                .filter(wallets::Column::OwnerId.eq(owner_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(wallets::Column::Id.ne(wallet_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::AlreadyExists(new_name.clone()));
            }

            let active = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id),
                name: ActiveValue::Set(new_name.clone()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
