// GET /api/categories — one card per cluster: 5 keywords, 3 titles, size.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::KQuery;
use crate::explorer::{CARD_EXAMPLES, CARD_KEYWORDS};
use crate::web::{api_error, AppState};

pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<KQuery>,
) -> Response {
    let model = match state.model(params.k).await {
        Ok(model) => model,
        Err(response) => return response,
    };

    match model.summaries(CARD_KEYWORDS, CARD_EXAMPLES) {
        Ok(categories) => Json(serde_json::json!({
            "k": model.k(),
            "categories": categories,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to summarize clusters");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Clustering failed")
        }
    }
}
