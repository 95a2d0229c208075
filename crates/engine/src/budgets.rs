//! Monthly spending limits per category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub limit: Money,
    pub spent: Money,
    pub remaining: Money,
    pub exceeded: bool,
}

impl BudgetStatus {
    pub(crate) fn new(
        budget_id: Uuid,
        category_id: Uuid,
        category_name: String,
        limit: Money,
        spent: Money,
    ) -> Self {
        let remaining = limit - spent;
        Self {
            budget_id,
            category_id,
            category_name,
            limit,
            spent,
            remaining,
            exceeded: spent > limit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub category_id: Uuid,
    /// `YYYY-MM`.
    pub month: String,
    pub limit_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flags_overspending() {
        let status = BudgetStatus::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Food".into(),
            Money::from_cents(100_00),
            Money::from_cents(120_50),
        );
        assert!(status.exceeded);
        assert_eq!(status.remaining, Money::from_cents(-20_50));
    }

    #[test]
    fn spending_exactly_the_limit_is_not_exceeded() {
        let status = BudgetStatus::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Food".into(),
            Money::from_cents(100_00),
            Money::from_cents(100_00),
        );
        assert!(!status.exceeded);
        assert_eq!(status.remaining, Money::ZERO);
    }
}
