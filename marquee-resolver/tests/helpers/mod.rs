//! Fake upstream providers for integration tests
//!
//! One local axum server plays all five upstreams under separate path
//! prefixes. Each provider can be told to answer normally, report a missing
//! title, or fail with a 500.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use marquee_common::config::TomlConfig;
use serde_json::{json, Value};

/// How a fake provider answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Ok,
    /// Provider answers but does not know the title
    Missing,
    /// Provider answers with a 500
    Broken,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Behavior {
    pub primary: Mode,
    pub fallback: Mode,
    pub credits: Mode,
    pub ratings: Mode,
    pub aggregator: Mode,
}

impl Behavior {
    /// Primary down, every fallback source healthy
    pub fn fallback_path() -> Self {
        Self {
            primary: Mode::Broken,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Calls {
    pub primary: AtomicUsize,
    pub fallback: AtomicUsize,
    pub credits: AtomicUsize,
    pub ratings: AtomicUsize,
    pub aggregator: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct FakeState {
    behavior: Behavior,
    calls: Arc<Calls>,
}

pub struct FakeUpstream {
    pub base_url: String,
    pub calls: Arc<Calls>,
}

impl FakeUpstream {
    /// Configuration pointing every adapter at this server
    pub fn config(&self) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.upstream.primary_url = format!("{}/primary", self.base_url);
        config.upstream.fallback_url = format!("{}/fallback", self.base_url);
        config.upstream.ratings_url = format!("{}/ratings", self.base_url);
        config.upstream.aggregator_url = format!("{}/aggregator", self.base_url);
        config.upstream.aggregator_image_url = "https://image.example/t/p/original".to_string();
        config.upstream.ratings_api_key = "test-ratings-key".to_string();
        config.upstream.aggregator_api_key = "test-aggregator-key".to_string();
        config.upstream.timeout_secs = 2;
        config
    }
}

/// Start a fake upstream server on an ephemeral port
pub async fn start(behavior: Behavior) -> FakeUpstream {
    let calls = Arc::new(Calls::default());
    let state = FakeState {
        behavior,
        calls: Arc::clone(&calls),
    };

    let app = Router::new()
        .route("/primary", get(primary))
        .route("/fallback/titles/:id", get(fallback_title))
        .route("/fallback/titles/:id/credits", get(fallback_credits))
        .route("/fallback/titles/:id/akas", get(fallback_akas))
        .route("/fallback/search/titles", get(fallback_search))
        .route("/ratings", get(ratings))
        .route("/aggregator/find/:id", get(aggregator_find))
        .route("/aggregator/movie/:native_id", get(aggregator_movie))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}", addr),
        calls,
    }
}

fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

fn missing() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response()
}

fn answer(mode: Mode, missing_body: impl FnOnce() -> Response, body: impl FnOnce() -> Value) -> Response {
    match mode {
        Mode::Ok => Json(body()).into_response(),
        Mode::Missing => missing_body(),
        Mode::Broken => broken(),
    }
}

async fn primary(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.primary.fetch_add(1, Ordering::SeqCst);
    if query.get("tt").map_or(true, |id| id != "tt1375666") {
        return Json(json!({"ok": false})).into_response();
    }
    answer(
        state.behavior.primary,
        || Json(json!({"ok": false})).into_response(),
        primary_page,
    )
}

async fn fallback_title(State(state): State<FakeState>, Path(id): Path<String>) -> Response {
    state.calls.fallback.fetch_add(1, Ordering::SeqCst);
    answer(state.behavior.fallback, missing, || fallback_page(&id))
}

async fn fallback_credits(State(state): State<FakeState>) -> Response {
    state.calls.credits.fetch_add(1, Ordering::SeqCst);
    answer(state.behavior.credits, missing, || {
        json!({
            "credits": [
                {"name": {"id": "nm0000138", "displayName": "Leonardo DiCaprio"}, "characters": ["Cobb"]},
                {"name": {"id": "nm0362766", "displayName": "Tom Hardy"}, "characters": ["Eames"]}
            ]
        })
    })
}

async fn fallback_akas(State(state): State<FakeState>) -> Response {
    answer(state.behavior.credits, missing, || {
        json!({"akas": [{"text": "El origen"}, {"text": "Origine"}]})
    })
}

async fn fallback_search(Query(query): Query<HashMap<String, String>>) -> Response {
    let text = query.get("query").cloned().unwrap_or_default().to_lowercase();
    if !text.contains("inception") {
        return Json(json!({"titles": []})).into_response();
    }
    Json(json!({
        "titles": [
            {"id": "tt1375666", "type": "movie", "primaryTitle": "Inception", "startYear": 2010,
             "primaryImage": {"url": "https://m.media-amazon.com/inception.jpg"},
             "rating": {"aggregateRating": 8.8}},
            {"id": "tt5295990", "type": "tvSeries", "primaryTitle": "Inception: The Cobol Job"}
        ]
    }))
    .into_response()
}

async fn ratings(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.ratings.fetch_add(1, Ordering::SeqCst);
    assert_eq!(query.get("apikey").map(String::as_str), Some("test-ratings-key"));
    answer(
        state.behavior.ratings,
        || Json(json!({"Response": "False", "Error": "Incorrect IMDb ID."})).into_response(),
        || {
            json!({
                "Title": "Inception",
                "Released": "16 Jul 2010",
                "Awards": "Won 4 Oscars. 159 wins & 220 nominations total",
                "Country": "United States, United Kingdom",
                "Metascore": "N/A",
                "Response": "True"
            })
        },
    )
}

async fn aggregator_find(
    State(state): State<FakeState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.aggregator.fetch_add(1, Ordering::SeqCst);
    assert_eq!(query.get("external_source").map(String::as_str), Some("imdb_id"));
    answer(
        state.behavior.aggregator,
        || Json(json!({"movie_results": [], "tv_results": []})).into_response(),
        || json!({"movie_results": [{"id": 27205}], "tv_results": []}),
    )
}

async fn aggregator_movie(Path(native_id): Path<u64>) -> Response {
    assert_eq!(native_id, 27205);
    Json(json!({
        "title": "Inception",
        "original_title": "Inception",
        "tagline": "Your mind is the scene of the crime.",
        "release_date": "2010-07-15",
        "poster_path": "/poster.jpg",
        "production_countries": [{"name": "United Kingdom"}, {"name": "United States of America"}],
        "production_companies": [{"name": "Legendary Pictures"}, {"name": "Syncopy"}],
        "budget": 160000000,
        "revenue": 825532764,
        "credits": {
            "cast": [
                {"id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb"},
                {"id": 24045, "name": "Joseph Gordon-Levitt", "character": "Arthur"},
                {"id": 27578, "name": "Elliot Page", "character": "Ariadne"},
                {"id": 2524, "name": "Tom Hardy", "character": "Eames"},
                {"id": 3899, "name": "Ken Watanabe", "character": "Saito"}
            ],
            "crew": [
                {"id": 525, "name": "Christopher Nolan", "job": "Director", "department": "Directing"},
                {"id": 525, "name": "Christopher Nolan", "job": "Writer", "department": "Writing"},
                {"id": 556, "name": "Emma Thomas", "job": "Producer", "department": "Production"}
            ]
        },
        "alternative_titles": {
            "titles": [
                {"title": "Origen", "iso_3166_1": "ES"},
                {"title": "Inception: Sapno Ka Safar", "iso_3166_1": "IN"}
            ]
        },
        "release_dates": {
            "results": [
                {"iso_3166_1": "DE", "release_dates": [{"certification": "12"}]},
                {"iso_3166_1": "US", "release_dates": [{"certification": ""}, {"certification": "PG-13"}]}
            ]
        }
    }))
    .into_response()
}

fn primary_page() -> Value {
    json!({
        "ok": true,
        "top": {
            "titleText": {"text": "Inception"},
            "titleType": {"text": "Movie"},
            "releaseYear": {"year": 2010},
            "ratingsSummary": {"aggregateRating": 8.8, "voteCount": 2600000}
        }
    })
}

fn fallback_page(id: &str) -> Value {
    json!({
        "id": id,
        "type": "movie",
        "primaryTitle": "Inception",
        "startYear": 2010,
        "runtimeSeconds": 8880,
        "plot": "A thief who steals corporate secrets through dream-sharing technology.",
        "genres": ["Action", "Adventure", "Sci-Fi"],
        "interests": [{"name": "Heist"}, {"name": "Action"}],
        "rating": {"aggregateRating": 8.8, "voteCount": 2600000},
        "metacritic": {"score": 74},
        "primaryImage": {"url": "https://m.media-amazon.com/images/M/MV5B._V1_.jpg"},
        "directors": [{"id": "nm0634240", "displayName": "Christopher Nolan"}],
        "writers": [{"id": "nm0634240", "displayName": "Christopher Nolan"}],
        "stars": [{"id": "nm0000138", "displayName": "Leonardo DiCaprio"}],
        "originCountries": [{"code": "US", "name": "United States"}],
        "spokenLanguages": [{"code": "eng", "name": "English"}]
    })
}
