use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::error_response;
use crate::{
    app::AppState,
    dataset::{Dataset, DatasetError, TWEET_COLUMN, TweetRecord},
    insights::{CategoryCount, sentiment_distribution},
    sentiment::ClassificationOutcome,
};

const UPLOAD_FIELD: &str = "file";
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyTextRequest {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    file_name: String,
    rows: usize,
    preview: Vec<TweetRecord>,
    distribution: Vec<CategoryCount>,
    warnings: Vec<String>,
}

/// 1件のテキストを分類する。翻訳に失敗しても200で`ERROR`ラベルと警告を返す。
pub(crate) async fn classify_text(
    State(state): State<AppState>,
    Json(payload): Json<ClassifyTextRequest>,
) -> Json<ClassificationOutcome> {
    let outcome = state.classifier().classify_detailed(&payload.text).await;
    Json(outcome)
}

/// アップロードされたデータセットの`Tweet`列を全行分類する。
pub(crate) async fn classify_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let metrics = state.telemetry().metrics();

    let (file_name, bytes) = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            metrics.uploads_rejected.inc();
            return error_response(StatusCode::BAD_REQUEST, "Please upload a file.");
        }
        Err(response) => {
            metrics.uploads_rejected.inc();
            return response;
        }
    };

    // xlsx のパースは重いのでブロッキングスレッドで行う
    let parse_name = file_name.clone();
    let parsed =
        tokio::task::spawn_blocking(move || Dataset::from_bytes(&parse_name, &bytes)).await;

    let mut dataset = match parsed {
        Ok(Ok(dataset)) => dataset,
        Err(error) => {
            metrics.uploads_rejected.inc();
            error!(file_name = %file_name, %error, "upload parsing task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to parse upload");
        }
        Ok(Err(error)) => {
            metrics.uploads_rejected.inc();
            warn!(file_name = %file_name, %error, "upload could not be parsed");
            let status = match error {
                DatasetError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            };
            return error_response(status, error.user_message());
        }
    };
    metrics.datasets_loaded.inc();

    if let Err(error) = dataset.require_column(TWEET_COLUMN) {
        metrics.uploads_rejected.inc();
        warn!(file_name = %file_name, %error, "upload rejected");
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, error.user_message());
    }

    let cells: Vec<Option<&str>> = dataset.records().iter().map(|r| r.tweet.as_deref()).collect();
    let outcome = state.classifier().classify_batch(cells).await;
    dataset.set_sentiments(outcome.results.iter().map(|r| r.label.to_string()));

    info!(
        file_name = %file_name,
        rows = dataset.len(),
        warnings = outcome.warnings.len(),
        "upload classified"
    );

    let body = UploadResponse {
        rows: dataset.len(),
        preview: dataset.head(PREVIEW_ROWS).to_vec(),
        distribution: sentiment_distribution(dataset.records()),
        warnings: outcome.warnings,
        file_name,
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<(String, Vec<u8>)>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(error) => {
                warn!(%error, "malformed multipart body");
                return Err(error_response(error.status(), error.body_text()));
            }
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        return match field.bytes().await {
            Ok(bytes) => Ok(Some((file_name, bytes.to_vec()))),
            Err(error) => {
                warn!(%error, "failed to read uploaded file");
                Err(error_response(error.status(), error.body_text()))
            }
        };
    }
}
