//! Wallets API endpoints.

use api_types::wallet::{WalletCreated, WalletListResponse, WalletNew, WalletUpdate, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{Owner, ServerError, convert::money, server::ServerState};

fn map_wallet(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        balance_minor: wallet.balance.cents(),
        closing_day: wallet.closing_day,
        due_day: wallet.due_day,
    }
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletCreated>), ServerError> {
    let id = state
        .engine
        .new_wallet(
            &owner,
            &payload.name,
            money(payload.opening_balance_minor),
            payload.closing_day,
            payload.due_day,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(WalletCreated { id })))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<WalletListResponse>, ServerError> {
    let wallets = state
        .engine
        .wallets(&owner)
        .await?
        .into_iter()
        .map(map_wallet)
        .collect();

    Ok(Json(WalletListResponse { wallets }))
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&owner, wallet_id).await?;
    Ok(Json(map_wallet(wallet)))
}

pub async fn rename(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
    Json(payload): Json<WalletUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .rename_wallet(&owner, wallet_id, &payload.name)
        .await?;

    Ok(StatusCode::OK)
}
