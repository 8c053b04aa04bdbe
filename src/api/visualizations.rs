use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error_response;
use crate::{
    app::AppState,
    insights::{Panel, VisualizationKind, build_panels},
};

#[derive(Debug, Deserialize)]
pub(crate) struct VisualizationRequest {
    #[serde(default)]
    datasets: Vec<String>,
    #[serde(default)]
    views: Vec<VisualizationKind>,
}

#[derive(Debug, Serialize)]
struct VisualizationResponse {
    datasets: Vec<String>,
    rows: usize,
    panels: Vec<Panel>,
}

/// 選択されたデータセットを連結し、選択されたビューごとのパネルを返す。
pub(crate) async fn render(
    State(state): State<AppState>,
    Json(payload): Json<VisualizationRequest>,
) -> Response {
    let catalog = state.catalog();
    let selected = payload.datasets;
    // xlsx のパースは重いのでブロッキングスレッドで行う
    let loaded = tokio::task::spawn_blocking(move || {
        let dataset = catalog.load_selected(selected.as_slice());
        (selected, dataset)
    })
    .await;

    let (selected, dataset) = match loaded {
        Ok((selected, Ok(Some(dataset)))) => (selected, dataset),
        Ok((_, Ok(None))) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Please select a dataset.");
        }
        Ok((selected, Err(error))) => {
            error!(datasets = ?selected, %error, "failed to load datasets");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, error.user_message());
        }
        Err(error) => {
            error!(%error, "dataset loading task failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to load datasets",
            );
        }
    };
    state.telemetry().metrics().datasets_loaded.inc();

    if payload.views.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Please select at least one visualization option.",
        );
    }

    let panels = build_panels(&dataset, &payload.views, state.insight_limits());
    info!(
        datasets = ?selected,
        rows = dataset.len(),
        panels = panels.len(),
        "visualizations built"
    );

    let catalog = state.catalog();
    let datasets = selected
        .into_iter()
        .filter(|name| catalog.path_of(name).is_some())
        .collect();
    let body = VisualizationResponse {
        datasets,
        rows: dataset.len(),
        panels,
    };
    (StatusCode::OK, Json(body)).into_response()
}
