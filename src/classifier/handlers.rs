use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::PredictResponse;
use super::model::ClassifyError;
use crate::{clock, error::AppError, state::AppState};

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

/// POST /predict (multipart, field `file`)
///
/// Classifies the upload and returns the label with a thumbnail. Nothing is
/// stored; clients persist the result through `/save-meal`.
#[instrument(skip(state, mp))]
pub async fn predict(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let mut mp = mp?;
    let mut upload = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let Some(image_bytes) = upload else {
        warn!("predict called without file field");
        return Err(AppError::Validation("file is required".into()));
    };

    let size = image_bytes.len();
    let classification = match state.classifier.classify(image_bytes).await {
        Ok(c) => c,
        Err(e @ ClassifyError::Decode(_)) => {
            warn!(error = %e, size, "image decode failed");
            return Err(e.into());
        }
        Err(e) => {
            error!(error = %e, size, "classification failed");
            return Err(e.into());
        }
    };

    info!(prediction = %classification.label, size, "image classified");
    Ok(Json(PredictResponse {
        prediction: classification.label,
        image: classification.thumbnail,
        timestamp: clock::now_timestamp(),
    }))
}
