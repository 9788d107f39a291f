mod dto;
pub mod handlers;
pub mod labels;
pub mod model;
pub mod onnx;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use model::{ClassifyError, FoodModel};
pub use services::Classifier;

pub fn router() -> Router<AppState> {
    handlers::predict_routes()
}
