use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    BudgetStatus, Direction, EngineError, Money, ResultEngine, budgets, calendar::add_months,
    categories, transactions, wallets,
};

use super::{Engine, with_tx};

/// `YYYY-MM` key and the `[first, next_first)` date range of a month.
fn month_range(year: i32, month: u32) -> ResultEngine<(String, NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        EngineError::InvalidArgument(format!("invalid month: {year}-{month:02}"))
    })?;
    let next = add_months(first, 1)?;
    Ok((format!("{year:04}-{month:02}"), first, next))
}

impl Engine {
    /// Sets the spending limit of a category for one month, replacing any
    /// previous limit.
    pub async fn set_budget(
        &self,
        owner_id: &str,
        category_id: Uuid,
        year: i32,
        month: u32,
        limit: Money,
    ) -> ResultEngine<Uuid> {
        let (key, _, _) = month_range(year, month)?;
        limit.ensure_positive("budget limit")?;
        with_tx!(self, |db_tx| {
            self.require_category_owned(&db_tx, owner_id, category_id)
                .await?;

            let existing = budgets::Entity::find()
                .filter(budgets::Column::OwnerId.eq(owner_id.to_string()))
                .filter(budgets::Column::CategoryId.eq(category_id))
                .filter(budgets::Column::Month.eq(key.clone()))
                .one(&db_tx)
                .await?;

            let id = match existing {
                Some(model) => {
                    let active = budgets::ActiveModel {
                        id: ActiveValue::Set(model.id),
                        limit_minor: ActiveValue::Set(limit.cents()),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                    model.id
                }
                None => {
                    let id = Uuid::new_v4();
                    let active = budgets::ActiveModel {
                        id: ActiveValue::Set(id),
                        owner_id: ActiveValue::Set(owner_id.to_string()),
                        category_id: ActiveValue::Set(category_id),
                        month: ActiveValue::Set(key.clone()),
                        limit_minor: ActiveValue::Set(limit.cents()),
                    };
                    active.insert(&db_tx).await?;
                    id
                }
            };
            Ok(id)
        })
    }

    /// Spending against every budget of the given month.
    ///
    /// `spent` sums the owner's expenses in the budget's category dated in
    /// that month, whatever the payment method.
    pub async fn budget_status(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<BudgetStatus>> {
        let (key, first, next) = month_range(year, month)?;
        with_tx!(self, |db_tx| {
            let rows = budgets::Entity::find()
                .filter(budgets::Column::OwnerId.eq(owner_id.to_string()))
                .filter(budgets::Column::Month.eq(key.clone()))
                .find_also_related(categories::Entity)
                .order_by_asc(budgets::Column::CategoryId)
                .all(&db_tx)
                .await?;
            if rows.is_empty() {
                return Ok(Vec::new());
            }

            let expenses = transactions::Entity::find()
                .join(JoinType::InnerJoin, transactions::Relation::Wallets.def())
                .filter(wallets::Column::OwnerId.eq(owner_id.to_string()))
                .filter(transactions::Column::Direction.eq(Direction::Expense.as_str()))
                .filter(transactions::Column::OccurredOn.gte(first))
                .filter(transactions::Column::OccurredOn.lt(next))
                .all(&db_tx)
                .await?;
            let mut spent_by_category: HashMap<Uuid, Money> = HashMap::new();
            for tx in expenses {
                *spent_by_category.entry(tx.category_id).or_default() +=
                    Money::from_cents(tx.amount_minor);
            }

            let mut statuses: Vec<BudgetStatus> = rows
                .into_iter()
                .map(|(budget, category)| {
                    BudgetStatus::new(
                        budget.id,
                        budget.category_id,
                        category.map(|c| c.name).unwrap_or_default(),
                        Money::from_cents(budget.limit_minor),
                        spent_by_category
                            .get(&budget.category_id)
                            .copied()
                            .unwrap_or(Money::ZERO),
                    )
                })
                .collect();
            statuses.sort_by(|a, b| a.category_name.cmp(&b.category_name));
            Ok(statuses)
        })
    }
}
