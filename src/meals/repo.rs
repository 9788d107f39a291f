use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::Mutex;

use super::dto::{whole_number, DailySummary};

/// Stored meal entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealRecord {
    pub id: u64,
    pub food_name: Option<String>,
    #[serde(serialize_with = "whole_number")]
    pub calories: f64,
    #[serde(serialize_with = "whole_number")]
    pub protein: f64,
    #[serde(serialize_with = "whole_number")]
    pub carbs: f64,
    #[serde(serialize_with = "whole_number")]
    pub fat: f64,
    pub image: Option<String>,
    pub timestamp: String, // as submitted, ISO-8601
    pub date: String,      // YYYY-MM-DD, derived from timestamp on insert
}

/// A meal ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub food_name: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub image: Option<String>,
    pub timestamp: String,
    pub date: String,
}

/// Process-lifetime meal log. All access goes through one lock.
#[derive(Debug)]
pub struct MealStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    meals: BTreeMap<u64, MealRecord>,
}

impl Default for MealStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MealStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                meals: BTreeMap::new(),
            }),
        }
    }

    /// Appends a meal and returns its id. Ids are never reused, even after
    /// deletes.
    pub async fn insert(&self, meal: NewMeal) -> u64 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.meals.insert(
            id,
            MealRecord {
                id,
                food_name: meal.food_name,
                calories: meal.calories,
                protein: meal.protein,
                carbs: meal.carbs,
                fat: meal.fat,
                image: meal.image,
                timestamp: meal.timestamp,
                date: meal.date,
            },
        );
        id
    }

    /// All meals in insertion order, or only those whose `date` equals `date`.
    pub async fn list(&self, date: Option<&str>) -> Vec<MealRecord> {
        let inner = self.inner.lock().await;
        inner
            .meals
            .values()
            .filter(|m| date.map_or(true, |d| m.date == d))
            .cloned()
            .collect()
    }

    pub async fn summarize(&self, date: &str) -> DailySummary {
        let inner = self.inner.lock().await;
        inner.meals.values().filter(|m| m.date == date).fold(
            DailySummary {
                date: date.to_string(),
                total_calories: 0.0,
                total_protein: 0.0,
                total_carbs: 0.0,
                total_fat: 0.0,
                meal_count: 0,
            },
            |mut acc, m| {
                acc.total_calories += m.calories;
                acc.total_protein += m.protein;
                acc.total_carbs += m.carbs;
                acc.total_fat += m.fat;
                acc.meal_count += 1;
                acc
            },
        )
    }

    /// Removes the meal with `id`. Returns whether anything was removed.
    pub async fn remove(&self, id: u64) -> bool {
        self.inner.lock().await.meals.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn meal(name: &str, calories: f64, date: &str) -> NewMeal {
        NewMeal {
            food_name: Some(name.to_string()),
            calories,
            protein: 1.0,
            carbs: 2.0,
            fat: 3.0,
            image: None,
            timestamp: format!("{date}T12:00:00"),
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_not_reused_after_delete() {
        let store = MealStore::new();
        let a = store.insert(meal("a", 1.0, "2024-05-01")).await;
        let b = store.insert(meal("b", 1.0, "2024-05-01")).await;
        assert_eq!((a, b), (1, 2));

        assert!(store.remove(a).await);
        let c = store.insert(meal("c", 1.0, "2024-05-01")).await;
        assert_eq!(c, 3);

        let ids: Vec<u64> = store.list(None).await.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn list_filters_by_exact_date() {
        let store = MealStore::new();
        store.insert(meal("a", 1.0, "2024-05-01")).await;
        store.insert(meal("b", 1.0, "2024-05-02")).await;
        store.insert(meal("c", 1.0, "2024-05-01")).await;

        let names: Vec<_> = store
            .list(Some("2024-05-01"))
            .await
            .into_iter()
            .filter_map(|m| m.food_name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(store.list(Some("2024-05")).await.is_empty());
        assert_eq!(store.list(None).await.len(), 3);
    }

    #[tokio::test]
    async fn summarize_sums_matching_day_only() {
        let store = MealStore::new();
        store.insert(meal("Pizza", 285.0, "2024-05-01")).await;
        store.insert(meal("Salad", 120.0, "2024-05-01")).await;
        store.insert(meal("Cake", 500.0, "2024-05-02")).await;

        let s = store.summarize("2024-05-01").await;
        assert_eq!(s.date, "2024-05-01");
        assert_eq!(s.total_calories, 405.0);
        assert_eq!(s.total_protein, 2.0);
        assert_eq!(s.total_carbs, 4.0);
        assert_eq!(s.total_fat, 6.0);
        assert_eq!(s.meal_count, 2);
    }

    #[tokio::test]
    async fn summarize_empty_day_is_zero() {
        let store = MealStore::new();
        let s = store.summarize("1999-01-01").await;
        assert_eq!(s.meal_count, 0);
        assert_eq!(s.total_calories, 0.0);
    }

    #[tokio::test]
    async fn remove_unknown_id_is_noop() {
        let store = MealStore::new();
        store.insert(meal("a", 1.0, "2024-05-01")).await;
        assert!(!store.remove(42).await);
        assert_eq!(store.list(None).await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(MealStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(meal(&format!("m{i}"), 1.0, "2024-05-01")).await
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
        assert_eq!(store.summarize("2024-05-01").await.meal_count, 32);
    }
}
