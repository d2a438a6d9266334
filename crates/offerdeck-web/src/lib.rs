//! axum JSON API over the OfferDeck board.
//!
//! The board lives behind a mutex in shared state: one logical actor mutates
//! it (category changes, expand/collapse), handlers only hold the lock for
//! synchronous derivations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use offerdeck_catalog::{load_catalog_fixture, normalize};
use offerdeck_core::OfferView;
use offerdeck_view::{OfferBoard, OfferDetail};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const CRATE_NAME: &str = "offerdeck-web";

pub const DEFAULT_CATALOG_PATH: &str = "fixtures/catalog/sample.json";

pub struct AppState {
    board: Mutex<OfferBoard>,
}

impl AppState {
    pub fn new(board: OfferBoard) -> Self {
        Self {
            board: Mutex::new(board),
        }
    }

    /// Build state from a provider payload on disk.
    pub fn from_catalog_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = load_catalog_fixture(path)?;
        let mut board = OfferBoard::new();
        board.load(normalize(&raw));
        Ok(Self::new(board))
    }

    fn board(&self) -> MutexGuard<'_, OfferBoard> {
        self.board.lock().expect("offer board lock poisoned")
    }
}

#[derive(Debug, Serialize)]
struct OffersResponse {
    active_category: String,
    offers: Vec<OfferView>,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    expanded: bool,
    detail: Option<OfferDetail>,
}

#[derive(Debug, Deserialize)]
struct SetCategoryRequest {
    category: String,
}

#[derive(Debug, Serialize)]
struct CategoryCountRow {
    category: String,
    count: usize,
    selected: bool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/offers", get(offers_handler))
        .route("/offers/{key}", get(offer_detail_handler))
        .route("/offers/{key}/toggle", post(toggle_handler))
        .route("/category", post(set_category_handler))
        .route("/categories", get(categories_handler))
        .with_state(Arc::new(state))
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    let port: u16 = std::env::var("OFFERDECK_WEB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let catalog_path = std::env::var("OFFERDECK_CATALOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));
    let state = AppState::from_catalog_path(&catalog_path)?;
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn offers_handler(State(state): State<Arc<AppState>>) -> Response {
    let board = state.board();
    Json(OffersResponse {
        active_category: board.active_category().to_string(),
        offers: board.visible_offers().into_iter().cloned().collect(),
    })
    .into_response()
}

async fn offer_detail_handler(
    State(state): State<Arc<AppState>>,
    AxumPath(key): AxumPath<String>,
) -> Response {
    let board = state.board();
    match board.offers().iter().find(|o| o.key == key) {
        Some(offer) => Json(OfferDetail::for_offer(offer, Utc::now())).into_response(),
        None => not_found(),
    }
}

async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    AxumPath(key): AxumPath<String>,
) -> Response {
    let mut board = state.board();
    if !board.offers().iter().any(|o| o.key == key) {
        return not_found();
    }
    board.toggle_details(&key);
    let detail = board.expanded_details(Utc::now());
    Json(ToggleResponse {
        expanded: detail.is_some(),
        detail,
    })
    .into_response()
}

async fn set_category_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCategoryRequest>,
) -> Response {
    let mut board = state.board();
    board.set_category(req.category);
    Json(OffersResponse {
        active_category: board.active_category().to_string(),
        offers: board.visible_offers().into_iter().cloned().collect(),
    })
    .into_response()
}

async fn categories_handler(State(state): State<Arc<AppState>>) -> Response {
    let board = state.board();
    let mut counts = BTreeMap::<String, usize>::new();
    for offer in board.offers() {
        *counts.entry(offer.category.clone()).or_default() += 1;
    }
    let active = board.active_category().to_string();
    let rows = counts
        .into_iter()
        .map(|(category, count)| CategoryCountRow {
            selected: category == active,
            category,
            count,
        })
        .collect::<Vec<_>>();
    Json(rows).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "offer not found" })),
    )
        .into_response()
}
