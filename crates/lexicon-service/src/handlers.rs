use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexicon_db::{Lexicon, MergeKey};
use lexicon_phonetic::Normalizer;
use lexicon_types::{Category, NormalizedEntry};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub lexicon: Arc<Lexicon>,
    pub normalizer: Arc<Normalizer>,
    pub max_page_size: usize,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub word: String,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct NormalizeQuery {
    pub text: String,
}

#[derive(Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    entry: &'a NormalizedEntry,
    /// Candidates merged into this entry.
    seen: u32,
}

#[derive(Serialize)]
struct LookupResponse<'a> {
    word: String,
    entries: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: String,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    items: Vec<&'a NormalizedEntry>,
}

#[derive(Serialize)]
struct CategoryCount {
    category: Category,
    count: usize,
}

#[derive(Serialize)]
struct StatsResponse {
    entries: usize,
    merge_key: MergeKey,
    categories: Vec<CategoryCount>,
}

#[derive(Serialize)]
struct NormalizeResponse {
    text: String,
    phonetic: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/lookup", get(lookup))
        .route("/v1/search", get(search))
        .route("/v1/stats", get(stats))
        .route("/v1/normalize", get(normalize))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Response, ApiError> {
    let word = params.word.trim();
    if word.is_empty() {
        return Err(ApiError::bad_request("word is required"));
    }
    let category = match params.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(
            Category::from_name(name)
                .ok_or_else(|| ApiError::bad_request(format!("unknown category '{name}'")))?,
        ),
    };

    let entries: Vec<EntryView<'_>> = state
        .lexicon
        .lookup(word)
        .into_iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .map(|entry| EntryView {
            entry,
            seen: state
                .lexicon
                .seen_count(&entry.headword, entry.category)
                .unwrap_or(1),
        })
        .collect();
    if entries.is_empty() {
        return Err(ApiError::NotFound(format!("no entries for '{word}'")));
    }

    let response = LookupResponse {
        word: word.to_string(),
        entries,
    };
    Ok(Json(response).into_response())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("q is required"));
    }

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let result = state.lexicon.search(query, page, page_size);
    let response = SearchResponse {
        query: query.to_string(),
        page,
        page_size,
        total: result.total,
        has_more: result.has_more,
        items: result.items,
    };
    Ok(Json(response).into_response())
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let categories = state
        .lexicon
        .category_counts()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    Json(StatsResponse {
        entries: state.lexicon.len(),
        merge_key: state.lexicon.merge_key(),
        categories,
    })
}

async fn normalize(
    State(state): State<AppState>,
    Query(params): Query<NormalizeQuery>,
) -> Json<NormalizeResponse> {
    let phonetic = state.normalizer.normalize(&params.text);
    Json(NormalizeResponse {
        text: params.text,
        phonetic,
    })
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
