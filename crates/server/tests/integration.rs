use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum_test::TestServer;
use moviefinder_catalog::{Catalog, CatalogError, MovieDetails, Video};
use moviefinder_core::images::ImageResolver;
use moviefinder_core::query::{CatalogQuery, DiscoverQuery};
use moviefinder_core::{CatalogResult, Genre, LanguageEntry, RawMovie};
use moviefinder_db::KvStore;
use moviefinder_server::routes::build_router;
use moviefinder_server::state::AppState;
use serde_json::{Value, json};

/// Catalog with `total_pages` pages of two French action movies each.
#[derive(Default)]
struct FakeCatalog {
    total_pages: u64,
    offline: bool,
    queries: Mutex<Vec<CatalogQuery>>,
}

impl FakeCatalog {
    fn serve(&self, query: CatalogQuery) -> Result<CatalogResult, CatalogError> {
        let n = query.page();
        self.queries.lock().unwrap().push(query);
        if self.offline {
            return Err(CatalogError::Unavailable("connection refused".into()));
        }
        let items = if u64::from(n) <= self.total_pages {
            (0..2)
                .map(|i| RawMovie {
                    id: (n * 10 + i).to_string(),
                    title: Some(format!("Movie {}", n * 10 + i)),
                    release_date: Some("2024-05-01".into()),
                    genre_ids: vec![28],
                    vote_average: Some(7.5),
                    original_language: Some("fr".into()),
                    ..Default::default()
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(CatalogResult::new(items, self.total_pages))
    }

    fn last_query(&self) -> CatalogQuery {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Catalog for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_popular(&self, page: u32) -> Result<CatalogResult, CatalogError> {
        self.serve(CatalogQuery::Popular { page })
    }

    async fn search_by_text(&self, text: &str, page: u32) -> Result<CatalogResult, CatalogError> {
        self.serve(CatalogQuery::Search {
            text: text.to_string(),
            page,
        })
    }

    async fn discover_by_facets(
        &self,
        query: &DiscoverQuery,
    ) -> Result<CatalogResult, CatalogError> {
        self.serve(CatalogQuery::Discover(query.clone()))
    }

    async fn get_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        if self.offline {
            return Err(CatalogError::Unavailable("connection refused".into()));
        }
        Ok(vec![Genre {
            id: 28,
            name: "Action".into(),
        }])
    }

    async fn get_languages(&self) -> Result<Vec<LanguageEntry>, CatalogError> {
        if self.offline {
            return Err(CatalogError::Unavailable("connection refused".into()));
        }
        Ok(vec![
            LanguageEntry {
                code: "en".into(),
                name: "English".into(),
            },
            LanguageEntry {
                code: "fr".into(),
                name: "French".into(),
            },
        ])
    }

    async fn get_details(&self, id: &str) -> Result<MovieDetails, CatalogError> {
        if id != "27205" {
            return Err(CatalogError::NotFound);
        }
        Ok(MovieDetails {
            movie: RawMovie {
                id: "27205".into(),
                title: Some("Inception".into()),
                release_date: Some("2010-07-15".into()),
                genres: vec![Genre {
                    id: 28,
                    name: "Action".into(),
                }],
                vote_average: Some(8.4),
                poster_path: Some("/inception.jpg".into()),
                ..Default::default()
            },
            tagline: Some("Your mind is the scene of the crime.".into()),
            runtime_minutes: Some(148),
            status: Some("Released".into()),
        })
    }

    async fn get_videos(&self, _id: &str) -> Result<Vec<Video>, CatalogError> {
        Ok(vec![
            Video {
                site: "YouTube".into(),
                kind: "Teaser".into(),
                key: "teaser1".into(),
                name: "Teaser".into(),
            },
            Video {
                site: "YouTube".into(),
                kind: "Trailer".into(),
                key: "YoHD9XEInc0".into(),
                name: "Official Trailer".into(),
            },
        ])
    }
}

/// Create a test server with an in-memory SQLite database.
async fn test_app(catalog: FakeCatalog) -> (TestServer, Arc<FakeCatalog>) {
    let pool = moviefinder_db::connect(":memory:").await.unwrap();
    moviefinder_db::migrate::run(&pool).await.unwrap();

    let catalog = Arc::new(catalog);
    let state = AppState::new(KvStore::new(pool), catalog.clone(), ImageResolver::default())
        .await
        .unwrap();

    (TestServer::new(build_router(state)).unwrap(), catalog)
}

fn catalog_with_pages(total_pages: u64) -> FakeCatalog {
    FakeCatalog {
        total_pages,
        ..Default::default()
    }
}

fn inception() -> Value {
    json!({
        "id": "27205",
        "title": "Inception",
        "year": "2010",
        "genre_names": ["Action"],
        "rating": 8.4,
        "poster_url": "https://image.tmdb.org/t/p/w342/inception.jpg",
        "overview": ""
    })
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn browse_defaults_to_newest_discovery() {
    let (server, catalog) = test_app(catalog_with_pages(3)).await;
    let resp = server.get("/api/v1/browse/newest").await;
    resp.assert_status_ok();
    let body: Value = resp.json();

    assert_eq!(body["listing"], "newest");
    assert_eq!(body["state"], "query=&genre=All&country=All&lang=Any&page=1");
    assert_eq!(body["status"]["state"], "ready");
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["empty"], false);

    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["id"], "10");
    assert_eq!(movies[0]["year"], "2024");
    assert_eq!(movies[0]["genre_names"], json!(["Action"]));
    assert_eq!(movies[0]["favorite"], false);

    assert_eq!(body["pagination"]["buttons"], json!([1, 2, 3]));
    assert_eq!(body["languages"]["available_now"][0]["code"], "fr");
    assert_eq!(body["languages"]["others"][0]["code"], "en");

    assert!(matches!(catalog.last_query(), CatalogQuery::Discover(_)));
}

#[tokio::test]
async fn popular_without_facets_uses_popular_endpoint() {
    let (server, catalog) = test_app(catalog_with_pages(2)).await;
    server.get("/api/v1/browse/popular").await.assert_status_ok();
    assert_eq!(catalog.last_query(), CatalogQuery::Popular { page: 1 });
}

#[tokio::test]
async fn browse_restores_shared_state() {
    let (server, catalog) = test_app(catalog_with_pages(5)).await;
    let resp = server
        .get("/api/v1/browse/popular")
        .add_raw_query_param("page=2&lang=FR&query=matrix&utm_source=mail")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();

    assert_eq!(body["state"], "query=matrix&genre=All&country=All&lang=fr&page=2");
    assert_eq!(body["filters"]["query"], "matrix");
    assert_eq!(body["filters"]["language"], "fr");
    assert_eq!(
        catalog.last_query(),
        CatalogQuery::Search {
            text: "matrix".into(),
            page: 2
        }
    );
}

#[tokio::test]
async fn page_past_the_end_is_clamped_and_refetched() {
    let (server, catalog) = test_app(catalog_with_pages(3)).await;
    let resp = server
        .get("/api/v1/browse/newest")
        .add_raw_query_param("page=9")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();

    assert_eq!(body["filters"]["page"], 3);
    assert_eq!(body["movies"][0]["id"], "30");
    assert_eq!(catalog.queries.lock().unwrap().len(), 2);
    assert_eq!(catalog.last_query().page(), 3);
}

#[tokio::test]
async fn malformed_shared_state_falls_back_to_defaults() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let resp = server
        .get("/api/v1/browse/newest")
        .add_raw_query_param("page=zero&genre=horror")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["state"], "query=&genre=All&country=All&lang=Any&page=1");
}

#[tokio::test]
async fn unknown_listing_is_bad_request() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let resp = server.get("/api/v1/browse/upcoming").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn catalog_outage_is_bad_gateway() {
    let (server, _) = test_app(FakeCatalog {
        offline: true,
        ..Default::default()
    })
    .await;
    let resp = server.get("/api/v1/browse/newest").await;
    resp.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "catalog_unavailable");

    // The language list degrades instead of failing.
    let resp = server.get("/api/v1/languages").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert!(body.as_array().unwrap().iter().any(|l| l["code"] == "ja"));

    server
        .get("/api/v1/genres")
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn movie_details_include_trailer_and_favorite_flag() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    server
        .post("/api/v1/favorites/toggle")
        .json(&inception())
        .await
        .assert_status_ok();

    let resp = server.get("/api/v1/movies/27205").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["title"], "Inception");
    assert_eq!(body["genre_names"], json!(["Action"]));
    assert_eq!(body["runtime_minutes"], 148);
    assert_eq!(body["trailer"]["key"], "YoHD9XEInc0");
    assert_eq!(
        body["trailer"]["url"],
        "https://www.youtube.com/watch?v=YoHD9XEInc0"
    );
    assert_eq!(body["favorite"], true);
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let resp = server.get("/api/v1/movies/1").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn favorites_toggle_list_and_remove() {
    let (server, _) = test_app(catalog_with_pages(1)).await;

    let resp = server
        .post("/api/v1/favorites/toggle")
        .json(&inception())
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body, json!({ "id": "27205", "favorite": true }));

    let body: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["favorites"][0], inception());

    server
        .delete("/api/v1/favorites/27205")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/favorites/27205")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let body: Value = server.get("/api/v1/favorites").await.json();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn toggling_twice_unfavorites() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    server.post("/api/v1/favorites/toggle").json(&inception()).await;
    let body: Value = server
        .post("/api/v1/favorites/toggle")
        .json(&inception())
        .await
        .json();
    assert_eq!(body["favorite"], false);
}

#[tokio::test]
async fn browse_marks_favorites() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let mut movie = inception();
    movie["id"] = json!("11");
    server.post("/api/v1/favorites/toggle").json(&movie).await;

    let body: Value = server.get("/api/v1/browse/newest").await.json();
    assert_eq!(body["movies"][0]["favorite"], false);
    assert_eq!(body["movies"][1]["id"], "11");
    assert_eq!(body["movies"][1]["favorite"], true);
}

#[tokio::test]
async fn toggle_without_id_is_rejected() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    let mut movie = inception();
    movie["id"] = json!("  ");
    let resp = server.post("/api/v1/favorites/toggle").json(&movie).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_is_a_json_attachment() {
    let (server, _) = test_app(catalog_with_pages(1)).await;
    server.post("/api/v1/favorites/toggle").json(&inception()).await;

    let resp = server.get("/api/v1/favorites/export").await;
    resp.assert_status_ok();
    assert_eq!(
        resp.header("content-disposition"),
        "attachment; filename=\"favorites.json\""
    );
    let exported: Value = serde_json::from_str(&resp.text()).unwrap();
    assert_eq!(exported, json!([inception()]));
}
