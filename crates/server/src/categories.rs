//! Categories API endpoints.

use api_types::category::{CategoryListResponse, CategoryNew, CategoryView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{Owner, ServerError, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        is_system: category.is_system,
    }
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.new_category(&owner, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .categories(&owner)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}
