// GET /api/map — every document placed on the 2-D PCA plane.
//
// The projection is recomputed per request on a blocking thread; it is
// linear in the number of non-zero TF-IDF entries.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::KQuery;
use crate::web::{api_error, AppState};

#[derive(Serialize)]
struct MapPoint<'a> {
    title: &'a str,
    description: &'a str,
    cluster_id: usize,
    x: f64,
    y: f64,
}

pub async fn get_map(State(state): State<AppState>, Query(params): Query<KQuery>) -> Response {
    let model = match state.model(params.k).await {
        Ok(model) => model,
        Err(response) => return response,
    };

    let projected = {
        let model = model.clone();
        tokio::task::spawn_blocking(move || model.projection()).await
    };
    let coordinates = match projected {
        Ok(Ok(coordinates)) => coordinates,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Projection failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Projection failed");
        }
        Err(e) => {
            tracing::error!(error = %e, "Projection task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Projection failed");
        }
    };

    let points: Vec<MapPoint> = state
        .documents
        .iter()
        .zip(model.labels())
        .zip(&coordinates)
        .map(|((doc, &cluster_id), &[x, y])| MapPoint {
            title: &doc.title,
            description: &doc.description,
            cluster_id,
            x,
            y,
        })
        .collect();

    Json(serde_json::json!({
        "k": model.k(),
        "points": points,
    }))
    .into_response()
}
