use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

use super::dto::{CreateItemRequest, ItemResponse, ListResponse};
use super::filter::{coerce_cost, coerce_purchase_date, ItemFilter, ListParams};
use super::repo::{self, NewItem};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/wardrobe", get(list_items))
        .route("/wardrobe/:id", get(get_item))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/wardrobe", post(create_item))
        .route("/wardrobe/:id", delete(delete_item))
}

#[instrument(skip(state, params))]
pub async fn list_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let filter = ItemFilter::from_params(params);
    debug!(user_id = %user_id, ?filter, "listing items");

    let (items, total_count) = repo::list(&state.db, user_id, &filter).await?;
    Ok(Json(ListResponse {
        items: items.into_iter().map(ItemResponse::from).collect(),
        total_count,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let item_type = payload
        .item_type
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let image_url = payload
        .image_url
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || item_type.is_empty() || image_url.is_empty() {
        return Err(AppError::BadRequest("Name, type and imageUrl required".into()));
    }

    let item = repo::create(
        &state.db,
        user_id,
        NewItem {
            name: name.to_string(),
            brand: none_if_blank(payload.brand),
            item_type: item_type.to_string(),
            size: none_if_blank(payload.size),
            color: none_if_blank(payload.color),
            cost: coerce_cost(payload.cost.as_ref()),
            purchase_date: coerce_purchase_date(payload.purchase_date.as_ref()),
            notes: none_if_blank(payload.notes),
            image_url: image_url.to_string(),
        },
    )
    .await?;

    info!(user_id = %user_id, item_id = %item.id, "item created");
    Ok(Json(item.into()))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    match repo::get(&state.db, user_id, id).await? {
        Some(item) => Ok(Json(item.into())),
        None => Err(AppError::NotFound),
    }
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    repo::delete(&state.db, user_id, id).await?;
    info!(user_id = %user_id, item_id = %id, "item deleted");
    Ok(Json(json!({ "ok": true })))
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
