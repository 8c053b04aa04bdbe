use axum::{Json, extract::State};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct DatasetListResponse {
    datasets: Vec<String>,
}

/// 選択可能なデータセット名（設定順）。
pub(crate) async fn list(State(state): State<AppState>) -> Json<DatasetListResponse> {
    let datasets = state
        .catalog()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(DatasetListResponse { datasets })
}
