use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use tavola_store::MenuItem;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct MenuResponse {
    categories: Vec<String>,
    items: Vec<MenuItem>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/menu", get(full_menu))
        .route("/v1/menu/{category}", get(menu_by_category))
}

async fn full_menu(State(state): State<AppState>) -> Json<MenuResponse> {
    Json(MenuResponse {
        categories: state.menu.categories(),
        items: state.menu.items().to_vec(),
    })
}

async fn menu_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let items: Vec<MenuItem> = state
        .menu
        .by_category(&category)
        .into_iter()
        .cloned()
        .collect();

    if items.is_empty() {
        return Err(AppError::NotFoundError(format!(
            "Menu category not found: {}",
            category
        )));
    }

    Ok(Json(items))
}
