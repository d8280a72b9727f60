// GET /api/stats — corpus and model size for the active k.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::KQuery;
use crate::web::AppState;

pub async fn get_stats(State(state): State<AppState>, Query(params): Query<KQuery>) -> Response {
    let model = match state.model(params.k).await {
        Ok(model) => model,
        Err(response) => return response,
    };

    Json(serde_json::json!({
        "documents": model.document_count(),
        "categories": model.k(),
        "vocabulary": model.vocabulary().len(),
        "inertia": model.inertia().ok(),
    }))
    .into_response()
}
