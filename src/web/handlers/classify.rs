// POST /api/classify — place an unseen plot summary in a category.
//
// Body: { "text": "...", "k": 15 }  (k optional)
// Returns 400 for blank text or k outside the explorer range.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::clustering::keywords::DEFAULT_KEYWORDS;
use crate::error::ClusterError;
use crate::explorer::CLASSIFY_EXAMPLES;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    pub k: Option<usize>,
}

pub async fn classify(State(state): State<AppState>, Json(body): Json<ClassifyRequest>) -> Response {
    if body.text.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "text must not be empty");
    }

    let model = match state.model(body.k).await {
        Ok(model) => model,
        Err(response) => return response,
    };

    match model.classify(&body.text, DEFAULT_KEYWORDS, CLASSIFY_EXAMPLES) {
        Ok(classification) => Json(classification).into_response(),
        Err(ClusterError::EmptyInput) => api_error(StatusCode::BAD_REQUEST, "text must not be empty"),
        Err(e) => {
            tracing::error!(error = %e, "Classification failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Classification failed")
        }
    }
}
