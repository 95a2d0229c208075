//! Subscriptions API endpoints.

use api_types::subscription::{
    SubscriptionDeleteQuery, SubscriptionDeleted, SubscriptionListResponse, SubscriptionNew,
    SubscriptionUpdate, SubscriptionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    Owner, ServerError,
    convert::{direction_from_api, frequency_from_api, map_subscription, method_from_api, money},
    server::ServerState,
};

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<SubscriptionNew>,
) -> Result<(StatusCode, Json<SubscriptionView>), ServerError> {
    let mut cmd = engine::NewSubscriptionCmd::new(
        owner,
        payload.name,
        money(payload.amount_minor),
        frequency_from_api(payload.frequency),
        payload.wallet_id,
        payload.next_billing_date,
    );
    if let Some(direction) = payload.direction {
        cmd = cmd.direction(direction_from_api(direction));
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(method) = payload.payment_method {
        cmd = cmd.payment_method(method_from_api(method));
    }

    let subscription = state.engine.new_subscription(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_subscription(subscription))))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<SubscriptionListResponse>, ServerError> {
    let subscriptions = state
        .engine
        .subscriptions(&owner)
        .await?
        .into_iter()
        .map(map_subscription)
        .collect();

    Ok(Json(SubscriptionListResponse { subscriptions }))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ServerError> {
    let subscription = state.engine.subscription(&owner, id).await?;
    Ok(Json(map_subscription(subscription)))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubscriptionUpdate>,
) -> Result<Json<SubscriptionView>, ServerError> {
    let cmd = engine::UpdateSubscriptionCmd {
        owner_id: owner,
        subscription_id: id,
        name: payload.name,
        amount: payload.amount_minor.map(money),
        direction: payload.direction.map(direction_from_api),
        frequency: payload.frequency.map(frequency_from_api),
        wallet_id: payload.wallet_id,
        category_id: payload.category_id,
        payment_method: payload.payment_method.map(method_from_api),
        next_billing_date: payload.next_billing_date,
    };
    let subscription = state.engine.update_subscription(cmd).await?;
    Ok(Json(map_subscription(subscription)))
}

pub async fn pause(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ServerError> {
    let subscription = state.engine.pause_subscription(&owner, id).await?;
    Ok(Json(map_subscription(subscription)))
}

pub async fn resume(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionView>, ServerError> {
    let subscription = state.engine.resume_subscription(&owner, id).await?;
    Ok(Json(map_subscription(subscription)))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubscriptionDeleteQuery>,
) -> Result<Json<SubscriptionDeleted>, ServerError> {
    let deleted = state
        .engine
        .delete_subscription(&owner, id, query.cascade)
        .await?;

    Ok(Json(SubscriptionDeleted {
        id: deleted.subscription_id,
        deleted_transactions: deleted.deleted_transactions,
    }))
}
