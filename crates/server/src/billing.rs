//! Billing trigger endpoint.

use api_types::billing::{
    BilledPeriodView, BillingFailureView, BillingRun, BillingSummaryResponse,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{Owner, ServerError, convert::map_direction, server::ServerState};

/// Runs one billing trigger over every owner's due subscriptions.
///
/// The caller identity is only logged: the scheduler, not the owner, decides
/// what is due.
pub async fn run(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<BillingRun>,
) -> Result<Json<BillingSummaryResponse>, ServerError> {
    let today = payload.date.unwrap_or_else(|| Utc::now().date_naive());
    tracing::info!(%owner, %today, "billing run requested");

    let summary = state.engine.trigger_subscription_billing(today).await?;
    let details = summary
        .details
        .into_iter()
        .map(|period| BilledPeriodView {
            subscription_id: period.subscription_id,
            name: period.name,
            transaction_id: period.transaction_id,
            direction: map_direction(period.direction),
            amount_minor: period.amount.cents(),
            billed_on: period.billed_on,
            next_billing_date: period.next_billing_date,
        })
        .collect();
    let failures = summary
        .failures
        .into_iter()
        .map(|failure| BillingFailureView {
            subscription_id: failure.subscription_id,
            name: failure.name,
            code: failure.code,
            error: failure.error,
        })
        .collect();

    Ok(Json(BillingSummaryResponse {
        processed: summary.processed,
        details,
        failures,
    }))
}
