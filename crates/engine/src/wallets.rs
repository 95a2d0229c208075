//! The module contains `Wallet` struct and its storage model.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// A wallet.
///
/// A wallet is a single cash account with one balance. Its balance is only
/// ever changed through the [`Ledger`](crate::Ledger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub balance: Money,
    /// Credit-line statement closing day, presentation only.
    pub closing_day: Option<u8>,
    /// Credit-line payment due day, presentation only.
    pub due_day: Option<u8>,
}

impl Wallet {
    pub fn new(
        owner_id: String,
        name: String,
        closing_day: Option<u8>,
        due_day: Option<u8>,
    ) -> ResultEngine<Self> {
        for (label, day) in [("closing_day", closing_day), ("due_day", due_day)] {
            if let Some(day) = day
                && !(1..=31).contains(&day)
            {
                return Err(EngineError::InvalidArgument(format!(
                    "{label} must be between 1 and 31, got {day}"
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            balance: Money::ZERO,
            closing_day,
            due_day,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub balance_minor: i64,
    pub closing_day: Option<i16>,
    pub due_day: Option<i16>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            owner_id: ActiveValue::Set(value.owner_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            balance_minor: ActiveValue::Set(value.balance.cents()),
            closing_day: ActiveValue::Set(value.closing_day.map(i16::from)),
            due_day: ActiveValue::Set(value.due_day.map(i16::from)),
        }
    }
}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            balance: Money::from_cents(model.balance_minor),
            closing_day: model.closing_day.and_then(|d| u8::try_from(d).ok()),
            due_day: model.due_day.and_then(|d| u8::try_from(d).ok()),
        }
    }
}
