// Zero Waste Kitchen - REST API with Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::freshness::{Clock, ExpiryWindow, SystemClock};
use crate::models::UserPantryRecord;
use crate::pantry::{PantryError, PantryService};
use crate::store::{DishStore, PantryStore};
use crate::suggest::{DishSuggester, DishSuggestions, SuggestError};

/// Everything the handlers need from a store
pub trait KitchenStore: DishStore + PantryStore + 'static {}

impl<S: DishStore + PantryStore + 'static> KitchenStore for S {}

/// Shared application state
pub struct AppState<S> {
    suggester: Arc<DishSuggester<S>>,
    pantry: Arc<PantryService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            suggester: Arc::clone(&self.suggester),
            pantry: Arc::clone(&self.pantry),
        }
    }
}

impl<S: KitchenStore> AppState<S> {
    pub fn new(store: Arc<S>, window: ExpiryWindow) -> Self {
        Self::with_clock(store, window, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, window: ExpiryWindow, clock: Arc<dyn Clock>) -> Self {
        Self {
            suggester: Arc::new(DishSuggester::with_clock(Arc::clone(&store), window, clock)),
            pantry: Arc::new(PantryService::new(store)),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User not found")]
    UserNotFound,

    #[error("User data not found")]
    PantryNotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            ApiError::PantryNotFound => {
                (StatusCode::NOT_FOUND, json!({ "message": self.to_string() }))
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ApiError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<SuggestError> for ApiError {
    fn from(e: SuggestError) -> Self {
        match e {
            SuggestError::UserNotFound => ApiError::UserNotFound,
            SuggestError::Store(e) => ApiError::Internal(e),
        }
    }
}

impl From<PantryError> for ApiError {
    fn from(e: PantryError) -> Self {
        match e {
            PantryError::UserNotFound => ApiError::UserNotFound,
            PantryError::LengthMismatch { .. } | PantryError::MissingField => {
                ApiError::BadRequest(e.to_string())
            }
            PantryError::Store(e) => ApiError::Internal(e),
        }
    }
}

/// Store calls block, so run them off the async workers
async fn run_blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(Into::into)
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub expiry_dates: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AddItemsResponse {
    message: &'static str,
    pantry: UserPantryRecord,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub item: String,
}

#[derive(Debug, Serialize)]
struct DeleteItemResponse {
    message: &'static str,
    removed: bool,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK", "version": crate::VERSION }))
}

/// GET /api/suggest_dishes/:user_id - Dishes that use the user's fresh ingredients
async fn suggest_dishes<S: KitchenStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<DishSuggestions>, ApiError> {
    let suggester = Arc::clone(&state.suggester);
    let suggestions = run_blocking(move || suggester.suggest_dishes(&user_id)).await?;

    Ok(Json(suggestions))
}

/// GET /api/get_items/:user_id - The user's pantry as stored
async fn get_items<S: KitchenStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPantryRecord>, ApiError> {
    let pantry = Arc::clone(&state.pantry);
    let record = run_blocking(move || pantry.list_pantry(&user_id)).await?;

    Ok(Json(record))
}

/// POST /api/add_items - Append items and expiry dates to a pantry
async fn add_items<S: KitchenStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<AddItemsRequest>,
) -> Result<Json<AddItemsResponse>, ApiError> {
    if request.user_id.is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let pantry = Arc::clone(&state.pantry);
    let record = run_blocking(move || {
        pantry.add_items(&request.user_id, &request.items, &request.expiry_dates)
    })
    .await?;

    Ok(Json(AddItemsResponse {
        message: "Items added successfully",
        pantry: record,
    }))
}

/// DELETE /api/delete_item - Remove one item and its expiry date
async fn delete_item<S: KitchenStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<DeleteItemRequest>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    let pantry = Arc::clone(&state.pantry);
    let removed = run_blocking(move || {
        pantry
            .delete_item(&request.user_id, &request.item)
            .map_err(|e| match e {
                PantryError::UserNotFound => ApiError::PantryNotFound,
                other => other.into(),
            })
    })
    .await?;

    Ok(Json(DeleteItemResponse {
        message: "Item deleted successfully",
        removed,
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S: KitchenStore>(state: AppState<S>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/suggest_dishes/:user_id", get(suggest_dishes::<S>))
        .route("/get_items/:user_id", get(get_items::<S>))
        .route("/add_items", post(add_items::<S>))
        .route("/delete_item", delete(delete_item::<S>))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
