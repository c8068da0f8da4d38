use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use moviefinder_catalog::{BrowseView, Completion, ViewStatus, pick_trailer};
use moviefinder_core::error::ApiError;
use moviefinder_core::languages::{LanguagePartition, fallback_languages};
use moviefinder_core::pagination::PageWindow;
use moviefinder_core::query::Listing;
use moviefinder_core::{FilterState, GenreLookup, LanguageEntry, MemoryState, NormalizedMovie};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/browse/{listing}", get(browse))
        .route("/genres", get(list_genres))
        .route("/languages", get(list_languages))
        .route("/movies/{id}", get(get_movie))
        // Favorites
        .route("/favorites", get(list_favorites))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/favorites/export", get(export_favorites))
        .route("/favorites/{id}", delete(remove_favorite))
        .route("/events", get(sse_events))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(state.kv.pool())
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Browse
// ---------------------------------------------------------------------------

/// A listing entry with the viewer's favorite flag.
#[derive(Serialize)]
struct MovieCard {
    #[serde(flatten)]
    movie: NormalizedMovie,
    favorite: bool,
}

#[derive(Serialize)]
struct BrowseResponse {
    listing: Listing,
    /// Canonical shareable state; echo it back to restore this view.
    state: String,
    filters: FilterState,
    status: ViewStatus,
    movies: Vec<MovieCard>,
    total_pages: u32,
    pagination: PageWindow,
    languages: LanguagePartition,
    empty: bool,
}

async fn browse(
    State(state): State<AppState>,
    Path(listing): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<BrowseResponse>, AppError> {
    let listing = Listing::from_str(&listing)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown listing: {listing}")))?;

    let mut view = BrowseView::new(MemoryState::new(query), listing, state.images.clone());
    view.load_lookups(state.catalog.as_ref()).await;

    let today = chrono::Utc::now().date_naive();
    if view.refresh(state.catalog.as_ref(), today).await == Completion::Failed {
        let message = match view.status() {
            ViewStatus::Failed(message) => message.clone(),
            _ => "Failed to load movies".to_string(),
        };
        return Err(ApiError::CatalogUnavailable(message).into());
    }

    let favorites = state.favorites.lock().await;
    let movies = view
        .movies()
        .iter()
        .map(|m| MovieCard {
            favorite: favorites.is_favorite(&m.id),
            movie: m.clone(),
        })
        .collect();
    drop(favorites);

    Ok(Json(BrowseResponse {
        listing,
        state: view.controller().encoded(),
        filters: view.filters().clone(),
        status: view.status().clone(),
        movies,
        total_pages: view.total_pages(),
        pagination: view.pagination(),
        languages: view.languages(),
        empty: view.is_empty(),
    }))
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

async fn list_genres(
    State(state): State<AppState>,
) -> Result<Json<Vec<moviefinder_core::Genre>>, AppError> {
    Ok(Json(state.catalog.get_genres().await?))
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageEntry>> {
    match state.catalog.get_languages().await {
        Ok(languages) if !languages.is_empty() => Json(languages),
        Ok(_) => Json(fallback_languages()),
        Err(e) => {
            warn!(error = %e, "language list unavailable, serving fallback");
            Json(fallback_languages())
        }
    }
}

// ---------------------------------------------------------------------------
// Movie details
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TrailerInfo {
    name: String,
    key: String,
    url: Option<String>,
}

#[derive(Serialize)]
struct MovieDetailResponse {
    #[serde(flatten)]
    movie: NormalizedMovie,
    tagline: Option<String>,
    runtime_minutes: Option<u32>,
    status: Option<String>,
    trailer: Option<TrailerInfo>,
    favorite: bool,
}

async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetailResponse>, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("movie id is required".into()).into());
    }

    let (details, videos) = tokio::join!(
        state.catalog.get_details(id),
        state.catalog.get_videos(id)
    );
    let details = details?;
    // A missing trailer never hides the details.
    let videos = videos.unwrap_or_else(|e| {
        warn!(id = %id, error = %e, "failed to load videos");
        Vec::new()
    });

    let trailer = pick_trailer(&videos).map(|v| TrailerInfo {
        name: v.name.clone(),
        key: v.key.clone(),
        url: v.watch_url(),
    });

    // Detail payloads carry genre objects, so no lookup table is needed.
    let movie = NormalizedMovie::from_raw(&details.movie, &GenreLookup::default(), &state.images);
    let favorite = state.favorites.lock().await.is_favorite(&movie.id);

    Ok(Json(MovieDetailResponse {
        movie,
        tagline: details.tagline,
        runtime_minutes: details.runtime_minutes,
        status: details.status,
        trailer,
        favorite,
    }))
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FavoritesResponse {
    count: usize,
    favorites: Vec<NormalizedMovie>,
}

async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let store = state.favorites.lock().await;
    Json(FavoritesResponse {
        count: store.len(),
        favorites: store.records().to_vec(),
    })
}

#[derive(Serialize)]
struct ToggleResponse {
    id: String,
    favorite: bool,
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Json(movie): Json<NormalizedMovie>,
) -> Result<Json<ToggleResponse>, AppError> {
    let id = movie.id.trim().to_string();
    if id.is_empty() {
        return Err(ApiError::BadRequest("movie id is required".into()).into());
    }

    let favorite = state.favorites.lock().await.toggle(&movie).await?;
    info!(id = %id, favorite, "favorite toggled");
    Ok(Json(ToggleResponse { id, favorite }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.favorites.lock().await.remove(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("{} is not a favorite", id.trim())).into())
    }
}

async fn export_favorites(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.favorites.lock().await.export_json()?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"favorites.json\"",
            ),
        ],
        body,
    ))
}

// ---------------------------------------------------------------------------
// SSE events
// ---------------------------------------------------------------------------

async fn sse_events(
    State(state): State<AppState>,
) -> axum::response::Sse<
    impl futures::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    use axum::response::sse::Event;
    use std::time::Duration;

    let mut rx = state.favorites.lock().await.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(evt) => {
                    if let Ok(data) = serde_json::to_string(&evt) {
                        yield Ok(Event::default().event("favorites").data(data));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    yield Ok(Event::default()
                        .event("error")
                        .data(format!(r#"{{"lagged":{n}}}"#)));
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    axum::response::Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
