use serde::{Deserialize, Serialize, Serializer};

use super::repo::MealRecord;

/// Body of `POST /save-meal`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SaveMealRequest {
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub image: Option<String>, // base64 thumbnail from /predict
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveMealResponse {
    pub message: String,
    pub meal_id: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// `?date=` with an empty value counts as absent.
    pub fn date(self) -> Option<String> {
        self.date.filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct MealHistoryResponse {
    pub meals: Vec<MealRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: String,
    #[serde(serialize_with = "whole_number")]
    pub total_calories: f64,
    #[serde(serialize_with = "whole_number")]
    pub total_protein: f64,
    #[serde(serialize_with = "whole_number")]
    pub total_carbs: f64,
    #[serde(serialize_with = "whole_number")]
    pub total_fat: f64,
    pub meal_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Writes `285.0` as `285`; fractional values stay floats.
pub fn whole_number<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if v.fract() == 0.0 && v.abs() < LIMIT {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}
