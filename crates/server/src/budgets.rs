//! Budgets API endpoints.

use api_types::budget::{
    BudgetCreated, BudgetSet, BudgetStatusQuery, BudgetStatusResponse, BudgetStatusView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{Owner, ServerError, convert::money, server::ServerState};

pub async fn set(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetSet>,
) -> Result<Json<BudgetCreated>, ServerError> {
    let id = state
        .engine
        .set_budget(
            &owner,
            payload.category_id,
            payload.year,
            payload.month,
            money(payload.limit_minor),
        )
        .await?;

    Ok(Json(BudgetCreated { id }))
}

pub async fn status(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetStatusQuery>,
) -> Result<Json<BudgetStatusResponse>, ServerError> {
    let budgets = state
        .engine
        .budget_status(&owner, query.year, query.month)
        .await?
        .into_iter()
        .map(|status| BudgetStatusView {
            budget_id: status.budget_id,
            category_id: status.category_id,
            category_name: status.category_name,
            limit_minor: status.limit.cents(),
            spent_minor: status.spent.cents(),
            remaining_minor: status.remaining.cents(),
            exceeded: status.exceeded,
        })
        .collect();

    Ok(Json(BudgetStatusResponse { budgets }))
}
