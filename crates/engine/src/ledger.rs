//! Wallet ledger.
//!
//! The ledger is the only code that writes `wallets.balance_minor`. Both
//! operations are a single conditional `UPDATE`, so the balance check and the
//! write happen atomically in the store and two concurrent debits can never
//! overspend a wallet.
//!
//! What a transaction does to the ledger is decided separately, as a pure
//! [`LedgerEffect`], and only then applied.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Direction, EngineError, Money, PaymentMethod, ResultEngine, wallets};

/// Balance change caused by a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum LedgerEffect {
    /// The transaction does not touch the wallet balance (deferred payment).
    None,
    Credit(Money),
    Debit(Money),
}

impl LedgerEffect {
    /// Effect of recording `amount` in `direction`, paid with `method`.
    ///
    /// Income always credits. An expense debits unless it is paid with the
    /// deferred method, which is settled outside the wallet.
    pub fn of(direction: Direction, method: PaymentMethod, amount: Money) -> Self {
        match direction {
            Direction::Income => Self::Credit(amount),
            Direction::Expense if method.is_deferred() => Self::None,
            Direction::Expense => Self::Debit(amount),
        }
    }

    /// The operation that undoes this effect.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Credit(amount) => Self::Debit(amount),
            Self::Debit(amount) => Self::Credit(amount),
        }
    }

    pub fn touches_ledger(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Signed change to the balance: positive for credits.
    pub fn delta(self) -> Money {
        match self {
            Self::None => Money::ZERO,
            Self::Credit(amount) => amount,
            Self::Debit(amount) => -amount,
        }
    }

    /// Applies the effect to `wallet_id` through the [`Ledger`].
    pub async fn apply<C: ConnectionTrait>(self, db: &C, wallet_id: Uuid) -> ResultEngine<()> {
        match self {
            Self::None => Ok(()),
            Self::Credit(amount) => Ledger::credit(db, wallet_id, amount).await.map(|_| ()),
            Self::Debit(amount) => Ledger::debit(db, wallet_id, amount).await.map(|_| ()),
        }
    }
}

/// Atomic balance operations on a wallet row.
///
/// Ownership checks are the caller's job; the ledger only enforces positive
/// amounts and the non-negative balance invariant.
pub struct Ledger;

impl Ledger {
    /// Increases the wallet balance by `amount` and returns the new balance.
    pub async fn credit<C: ConnectionTrait>(
        db: &C,
        wallet_id: Uuid,
        amount: Money,
    ) -> ResultEngine<Money> {
        amount.ensure_positive("credit amount")?;

        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).add(amount.cents()),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
        }

        let balance = Self::balance(db, wallet_id).await?;
        tracing::debug!(%wallet_id, %amount, %balance, "wallet credited");
        Ok(balance)
    }

    /// Decreases the wallet balance by `amount` and returns the new balance.
    ///
    /// The `balance >= amount` guard is part of the same `UPDATE`, so an
    /// over-debit leaves the balance untouched and reports
    /// `InsufficientFunds`.
    pub async fn debit<C: ConnectionTrait>(
        db: &C,
        wallet_id: Uuid,
        amount: Money,
    ) -> ResultEngine<Money> {
        amount.ensure_positive("debit amount")?;

        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).sub(amount.cents()),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .filter(wallets::Column::BalanceMinor.gte(amount.cents()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            let current = Self::balance(db, wallet_id).await?;
            return Err(EngineError::InsufficientFunds(format!(
                "balance {current} is lower than {amount}"
            )));
        }

        let balance = Self::balance(db, wallet_id).await?;
        tracing::debug!(%wallet_id, %amount, %balance, "wallet debited");
        Ok(balance)
    }

    /// Current balance of a wallet.
    pub async fn balance<C: ConnectionTrait>(db: &C, wallet_id: Uuid) -> ResultEngine<Money> {
        wallets::Entity::find_by_id(wallet_id)
            .one(db)
            .await?
            .map(|model| Money::from_cents(model.balance_minor))
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }
}
