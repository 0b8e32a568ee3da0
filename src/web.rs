//! HTTP API for the pantry
//!
//! JSON endpoints for recipe and inventory CRUD plus the derived shopping
//! list and nutrition report. Every response uses the `ApiResponse` envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

use crate::database::{
    create_recipe, delete_inventory_item, delete_recipe, get_recipe, list_inventory,
    list_recipes, snapshot, update_recipe, upsert_inventory_item,
};
use crate::error::PantryError;
use crate::formatters::{sorted_shopping_lines, ShoppingLine, EMPTY_NUTRITION, EMPTY_SHOPPING_LIST};
use crate::models::{InventoryItem, MacroShares, NutritionTotals, Recipe, RecipeId};
use crate::nutrition::{compute_totals, NutrientTable};
use crate::shopping::compute_shopping_needs;
use crate::validation::{InventoryDraft, RecipeDraft};

/// Shared application state (database connection + nutrient table)
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    nutrients: Arc<NutrientTable>,
}

impl AppState {
    pub fn new(db: Arc<Mutex<Connection>>, nutrients: Arc<NutrientTable>) -> Self {
        Self { db, nutrients }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiFailure> {
        self.db.lock().map_err(|_| {
            log::error!("Database mutex poisoned");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
        })
    }
}

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

fn failure(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

impl From<PantryError> for ApiFailure {
    fn from(err: PantryError) -> Self {
        match err {
            PantryError::Validation(msg) => failure(StatusCode::BAD_REQUEST, msg),
            PantryError::NotFound(what) => failure(StatusCode::NOT_FOUND, format!("{what} not found")),
            other => {
                log::error!("Request failed: {}", other);
                failure(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

fn db_failure(err: rusqlite::Error) -> ApiFailure {
    PantryError::from(err).into()
}

/// Unwraps a JSON body, answering malformed payloads inside the envelope
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection.body_text());
            Err(failure(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

/// Unwraps a path parameter, answering unparsable values inside the envelope
fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, ApiFailure> {
    match param {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            log::debug!("Rejected path parameter: {}", rejection.body_text());
            Err(failure(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

/// Shopping list response
#[derive(Serialize)]
struct ShoppingListData {
    items: Vec<ShoppingLine>,
    empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Nutrition report response
#[derive(Serialize)]
struct NutritionData {
    totals: NutritionTotals,
    shares: Option<MacroShares>,
    empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// GET /api/recipes
async fn list_recipes_handler(State(state): State<AppState>) -> ApiResult<Vec<Recipe>> {
    let conn = state.conn()?;
    ok(list_recipes(&conn).map_err(db_failure)?)
}

/// POST /api/recipes
async fn create_recipe_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> ApiResult<Recipe> {
    let recipe = json_body(payload)?.validate()?;
    let conn = state.conn()?;
    ok(create_recipe(&conn, &recipe).map_err(db_failure)?)
}

/// GET /api/recipes/{id}
async fn get_recipe_handler(
    State(state): State<AppState>,
    id: Result<Path<RecipeId>, PathRejection>,
) -> ApiResult<Recipe> {
    let id = path_param(id)?;
    let conn = state.conn()?;
    match get_recipe(&conn, id).map_err(db_failure)? {
        Some(recipe) => ok(recipe),
        None => Err(PantryError::NotFound(format!("recipe {id}")).into()),
    }
}

/// PUT /api/recipes/{id}
async fn update_recipe_handler(
    State(state): State<AppState>,
    id: Result<Path<RecipeId>, PathRejection>,
    payload: Result<Json<RecipeDraft>, JsonRejection>,
) -> ApiResult<Recipe> {
    let id = path_param(id)?;
    let recipe = json_body(payload)?.validate()?;
    let conn = state.conn()?;
    match update_recipe(&conn, id, &recipe).map_err(db_failure)? {
        Some(updated) => ok(updated),
        None => Err(PantryError::NotFound(format!("recipe {id}")).into()),
    }
}

/// DELETE /api/recipes/{id}
async fn delete_recipe_handler(
    State(state): State<AppState>,
    id: Result<Path<RecipeId>, PathRejection>,
) -> ApiResult<RecipeId> {
    let id = path_param(id)?;
    let conn = state.conn()?;
    if delete_recipe(&conn, id).map_err(db_failure)? {
        ok(id)
    } else {
        Err(PantryError::NotFound(format!("recipe {id}")).into())
    }
}

/// GET /api/inventory
async fn list_inventory_handler(State(state): State<AppState>) -> ApiResult<Vec<InventoryItem>> {
    let conn = state.conn()?;
    ok(list_inventory(&conn).map_err(db_failure)?)
}

/// PUT /api/inventory
async fn upsert_inventory_handler(
    State(state): State<AppState>,
    payload: Result<Json<InventoryDraft>, JsonRejection>,
) -> ApiResult<InventoryItem> {
    let item = json_body(payload)?.validate()?;
    let conn = state.conn()?;
    upsert_inventory_item(&conn, &item).map_err(db_failure)?;
    ok(item)
}

/// DELETE /api/inventory/{name}
async fn delete_inventory_handler(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult<String> {
    let name = path_param(name)?;
    let conn = state.conn()?;
    if delete_inventory_item(&conn, &name).map_err(db_failure)? {
        ok(name)
    } else {
        Err(PantryError::NotFound(format!("inventory item '{name}'")).into())
    }
}

/// GET /api/shopping-list
async fn shopping_list_handler(State(state): State<AppState>) -> ApiResult<ShoppingListData> {
    let snap = {
        let mut conn = state.conn()?;
        snapshot(&mut conn).map_err(db_failure)?
    };

    let needs = compute_shopping_needs(&snap.recipes, &snap.inventory);
    let empty = needs.is_empty();
    ok(ShoppingListData {
        items: sorted_shopping_lines(&needs),
        empty,
        message: empty.then_some(EMPTY_SHOPPING_LIST),
    })
}

/// GET /api/nutrition
async fn nutrition_handler(State(state): State<AppState>) -> ApiResult<NutritionData> {
    let recipes = {
        let conn = state.conn()?;
        list_recipes(&conn).map_err(db_failure)?
    };

    let totals = compute_totals(&recipes, &state.nutrients);
    let empty = totals.is_zero();
    ok(NutritionData {
        totals,
        shares: totals.shares(),
        empty,
        message: empty.then_some(EMPTY_NUTRITION),
    })
}

/// Build the web server router
pub fn create_router(db: Arc<Mutex<Connection>>, nutrients: Arc<NutrientTable>) -> Router {
    let state = AppState::new(db, nutrients);

    Router::new()
        .route(
            "/api/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route(
            "/api/recipes/{id}",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .delete(delete_recipe_handler),
        )
        .route(
            "/api/inventory",
            get(list_inventory_handler).put(upsert_inventory_handler),
        )
        .route(
            "/api/inventory/{name}",
            axum::routing::delete(delete_inventory_handler),
        )
        .route("/api/shopping-list", get(shopping_list_handler))
        .route("/api/nutrition", get(nutrition_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server and run until Ctrl-C
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    nutrients: Arc<NutrientTable>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let app = create_router(db, nutrients);

    log::info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("Shutting down HTTP API");
        })
        .await
}
