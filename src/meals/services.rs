use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::info;

use super::dto::{DailySummary, SaveMealRequest};
use super::repo::{MealStore, NewMeal};
use crate::{clock, error::AppError};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar date written in an ISO-8601 timestamp. Offsets are not applied:
/// `2024-05-01T23:30:00-05:00` is on 2024-05-01.
pub fn date_of(timestamp: &str) -> Option<NaiveDate> {
    let ts = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }

    // a trailing `Z` is UTC
    let ts = match ts.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => ts.to_string(),
    };
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(&ts, f).ok())
    {
        return Some(dt.date_naive());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&ts, f).ok())
        // hour only, e.g. `2024-05-01T12`
        .or_else(|| NaiveDateTime::parse_from_str(&format!("{ts}:00"), "%Y-%m-%dT%H:%M").ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(&ts, "%Y-%m-%d").ok())
}

/// Fills defaults (zero nutrients, current time) and derives `date`.
pub fn new_meal(req: SaveMealRequest) -> Result<NewMeal, AppError> {
    let timestamp = req.timestamp.unwrap_or_else(clock::now_timestamp);
    let date = date_of(&timestamp)
        .ok_or_else(|| {
            AppError::Validation(format!("timestamp {timestamp:?} is not an ISO-8601 datetime"))
        })?
        .format("%Y-%m-%d")
        .to_string();

    Ok(NewMeal {
        food_name: req.food_name,
        calories: req.calories.unwrap_or(0.0),
        protein: req.protein.unwrap_or(0.0),
        carbs: req.carbs.unwrap_or(0.0),
        fat: req.fat.unwrap_or(0.0),
        image: req.image,
        timestamp,
        date,
    })
}

pub async fn save_meal(store: &MealStore, req: SaveMealRequest) -> Result<u64, AppError> {
    let meal = new_meal(req)?;
    let date = meal.date.clone();
    let id = store.insert(meal).await;
    info!(meal_id = id, %date, "meal saved");
    Ok(id)
}

/// Totals for `date`, or for today in local time when absent.
pub async fn daily_summary(store: &MealStore, date: Option<String>) -> DailySummary {
    let date = date.unwrap_or_else(clock::today);
    store.summarize(&date).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_of_accepts_common_iso_forms() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for ts in [
            "2024-05-01T12:30:45.123456",
            "2024-05-01T12:30:45",
            "2024-05-01 12:30:45",
            "2024-05-01T12:30",
            "2024-05-01T12:30:45Z",
            "2024-05-01T12:30:45.5+02:00",
            "2024-05-01T12:30+02:00",
            "2024-05-01T12:30Z",
            "2024-05-01T12:30:45+0200",
            "2024-05-01 12:30:45+02:00",
            "2024-05-01 12:30-03:00",
            "2024-05-01T12",
            "2024-05-01",
        ] {
            assert_eq!(date_of(ts), Some(d), "{ts}");
        }
    }

    #[test]
    fn date_of_keeps_the_written_date_regardless_of_offset() {
        assert_eq!(
            date_of("2024-05-01T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn date_of_rejects_garbage() {
        assert_eq!(date_of("yesterday"), None);
        assert_eq!(date_of(""), None);
        assert_eq!(date_of("2024-13-01"), None);
        assert_eq!(date_of("2024-05-01T25"), None);
    }

    #[test]
    fn new_meal_defaults_missing_nutrients_to_zero() {
        let meal = new_meal(SaveMealRequest {
            food_name: Some("Pizza".into()),
            calories: Some(285.0),
            timestamp: Some("2024-05-01T19:00:00".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(meal.calories, 285.0);
        assert_eq!((meal.protein, meal.carbs, meal.fat), (0.0, 0.0, 0.0));
        assert_eq!(meal.date, "2024-05-01");
        assert_eq!(meal.timestamp, "2024-05-01T19:00:00");
        assert_eq!(meal.image, None);
    }

    #[test]
    fn new_meal_defaults_timestamp_to_now() {
        let meal = new_meal(SaveMealRequest::default()).unwrap();
        assert_eq!(meal.calories, 0.0);
        assert!(DateTime::parse_from_rfc3339(&meal.timestamp).is_ok());
        assert_eq!(meal.date.len(), 10);
    }

    #[test]
    fn new_meal_accepts_negative_values_as_is() {
        let meal = new_meal(SaveMealRequest {
            calories: Some(-50.0),
            timestamp: Some("2024-05-01".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(meal.calories, -50.0);
    }

    #[test]
    fn new_meal_rejects_unparseable_timestamp() {
        let err = new_meal(SaveMealRequest {
            timestamp: Some("last tuesday".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn daily_summary_defaults_to_today() {
        let store = MealStore::new();
        save_meal(
            &store,
            SaveMealRequest {
                calories: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let s = daily_summary(&store, None).await;
        assert_eq!(s.date, clock::today());
        assert_eq!(s.meal_count, 1);
        assert_eq!(s.total_calories, 100.0);
    }
}
