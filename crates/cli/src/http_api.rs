use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use netinsight_search::{SearchError, SearchService, DEFAULT_SEARCH_K};
use netinsight_vector_store::{ErrorKind, RankedResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

pub enum ApiError {
    Search(SearchError),
    InvalidBody(serde_json::Error),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self::Search(err)
    }
}

pub(crate) const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::CorruptData | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (kind, error) = match self {
            Self::Search(err) => {
                let kind = err.kind();
                if status_for(kind).is_server_error() {
                    log::error!("Search failed: {err}");
                }
                (kind, err.to_string())
            }
            Self::InvalidBody(err) => (
                ErrorKind::InvalidInput,
                format!("Invalid JSON request: {err}"),
            ),
        };
        let body = ErrorBody {
            error,
            kind: kind.as_str(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

pub fn router(service: SearchService) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", post(search))
        .with_state(service)
}

async fn home(State(service): State<SearchService>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "documents": service.document_count().await,
        "endpoints": {
            "search": {
                "url": "/search",
                "method": "POST",
                "parameters": {
                    "query": "string",
                    "k": format!("integer (optional, default={DEFAULT_SEARCH_K})"),
                }
            }
        }
    }))
}

async fn search(
    State(service): State<SearchService>,
    body: Bytes,
) -> Result<Json<Vec<RankedResult>>, ApiError> {
    let request: SearchRequest = serde_json::from_slice(&body).map_err(ApiError::InvalidBody)?;
    let k = request.k.unwrap_or(DEFAULT_SEARCH_K);
    let ranked = service.optimize_query(&request.query, k).await?;
    Ok(Json(ranked))
}
