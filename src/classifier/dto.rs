use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub image: String,
    pub timestamp: String,
}
