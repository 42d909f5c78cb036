// 🍳 Dish Suggestions - freshness filter, then dish membership lookup

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::freshness::{Clock, ExpiryWindow, SystemClock};
use crate::store::{DishStore, UserStore};

pub const NO_VALID_INGREDIENTS: &str = "No valid ingredients found";

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("User not found")]
    UserNotFound,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Result of one suggestion request.
/// `suggested_dishes` is deduplicated and in no particular order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishSuggestions {
    pub suggested_dishes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DishSuggestions {
    fn found(names: HashSet<String>) -> Self {
        Self {
            suggested_dishes: names.into_iter().collect(),
            message: None,
        }
    }

    fn no_valid_ingredients() -> Self {
        Self {
            suggested_dishes: Vec::new(),
            message: Some(NO_VALID_INGREDIENTS.to_string()),
        }
    }
}

/// Turns a user's pantry into dish names
pub struct DishSuggester<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window: ExpiryWindow,
}

impl<S: UserStore + DishStore> DishSuggester<S> {
    pub fn new(store: Arc<S>, window: ExpiryWindow) -> Self {
        Self::with_clock(store, window, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, window: ExpiryWindow, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, window }
    }

    pub fn suggest_dishes(&self, user_id: &str) -> Result<DishSuggestions, SuggestError> {
        let pantry = self
            .store
            .find_pantry(user_id)?
            .ok_or(SuggestError::UserNotFound)?;

        let now = self.clock.now();
        let valid = self
            .window
            .valid_ingredients(&pantry.ingredients, &pantry.expiry_dates, now);

        debug!(
            user_id,
            pantry_size = pantry.ingredients.len(),
            valid = valid.len(),
            "Filtered pantry"
        );

        if valid.is_empty() {
            return Ok(DishSuggestions::no_valid_ingredients());
        }

        let names: HashSet<String> = self
            .store
            .find_dishes_with_any_ingredient(&valid)?
            .into_iter()
            .map(|dish| dish.name)
            .collect();

        info!(user_id, dishes = names.len(), "Suggested dishes");

        Ok(DishSuggestions::found(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::freshness::{format_expiry_date, FixedClock};
    use crate::models::{DishRecord, UserPantryRecord};
    use crate::store::PantryStore;
    use anyhow::{anyhow, Result};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn days_from_now(days: i64) -> String {
        format_expiry_date((now() + Duration::days(days)).date())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn as_set(suggestions: &DishSuggestions) -> HashSet<&str> {
        suggestions.suggested_dishes.iter().map(String::as_str).collect()
    }

    fn store_with(pantries: &[UserPantryRecord], dishes: &[DishRecord]) -> Arc<SqliteStore> {
        let store = SqliteStore::open_in_memory().unwrap();
        for pantry in pantries {
            store.save_pantry(pantry).unwrap();
        }
        store.insert_dishes(dishes).unwrap();
        Arc::new(store)
    }

    fn pantry(user_id: &str, ingredients: &[&str], expiry_dates: &[String]) -> UserPantryRecord {
        UserPantryRecord {
            user_id: user_id.to_string(),
            ingredients: strings(ingredients),
            expiry_dates: expiry_dates.to_vec(),
        }
    }

    fn suggester(store: Arc<SqliteStore>) -> DishSuggester<SqliteStore> {
        DishSuggester::with_clock(store, ExpiryWindow::default(), Arc::new(FixedClock(now())))
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let store = store_with(&[], &[DishRecord::new("Omelette", &["egg"])]);

        let result = suggester(store).suggest_dishes("ghost");
        assert!(matches!(result, Err(SuggestError::UserNotFound)));
    }

    #[test]
    fn test_expired_ingredient_is_excluded() {
        let store = store_with(
            &[pantry("u1", &["egg", "milk"], &[days_from_now(5), days_from_now(-1)])],
            &[
                DishRecord::new("Omelette", &["egg", "butter"]),
                DishRecord::new("Milkshake", &["milk", "banana"]),
            ],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(as_set(&suggestions), HashSet::from(["Omelette"]));
        assert_eq!(suggestions.message, None);
    }

    #[test]
    fn test_empty_pantry_reports_no_valid_ingredients() {
        let store = store_with(&[pantry("u1", &[], &[])], &[DishRecord::new("Omelette", &["egg"])]);

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert!(suggestions.suggested_dishes.is_empty());
        assert_eq!(suggestions.message.as_deref(), Some(NO_VALID_INGREDIENTS));
    }

    #[test]
    fn test_only_unusable_ingredients_reports_no_valid_ingredients() {
        let store = store_with(
            &[pantry(
                "u1",
                &["egg", "rice", "milk"],
                &[days_from_now(29), "not-a-date".to_string(), days_from_now(-3)],
            )],
            &[DishRecord::new("Omelette", &["egg"])],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(suggestions, DishSuggestions::no_valid_ingredients());
    }

    #[test]
    fn test_valid_ingredients_without_matching_dishes() {
        let store = store_with(
            &[pantry("u1", &["saffron"], &[days_from_now(3)])],
            &[DishRecord::new("Omelette", &["egg"])],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert!(suggestions.suggested_dishes.is_empty());
        assert_eq!(suggestions.message, None);
    }

    #[test]
    fn test_duplicate_dish_names_collapse() {
        let store = store_with(
            &[pantry("u1", &["lettuce", "tomato"], &[days_from_now(2), days_from_now(4)])],
            &[
                DishRecord::new("Salad", &["lettuce", "cucumber"]),
                DishRecord::new("Salad", &["tomato", "onion"]),
                DishRecord::new("salad", &["tomato"]),
            ],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(suggestions.suggested_dishes.len(), 2);
        assert_eq!(as_set(&suggestions), HashSet::from(["Salad", "salad"]));
    }

    #[test]
    fn test_pairing_truncates_to_dates() {
        let store = store_with(
            &[pantry("u1", &["a", "b", "c"], &[days_from_now(1)])],
            &[
                DishRecord::new("Uses A", &["a"]),
                DishRecord::new("Uses B", &["b"]),
                DishRecord::new("Uses C", &["c"]),
            ],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(as_set(&suggestions), HashSet::from(["Uses A"]));
    }

    #[test]
    fn test_window_edges() {
        let store = store_with(
            &[pantry(
                "u1",
                &["edge", "beyond", "today"],
                &[days_from_now(28), days_from_now(29), days_from_now(0)],
            )],
            &[
                DishRecord::new("Edge Dish", &["edge"]),
                DishRecord::new("Beyond Dish", &["beyond"]),
                DishRecord::new("Today Dish", &["today"]),
            ],
        );

        // "today" is midnight, already behind 09:30
        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(as_set(&suggestions), HashSet::from(["Edge Dish"]));
    }

    #[test]
    fn test_very_large_pantry_still_suggests() {
        let count = 40_000;
        let ingredients = vec!["egg"; count];
        let dates = vec![days_from_now(3); count];

        let store = store_with(
            &[pantry("u1", &ingredients, &dates)],
            &[DishRecord::new("Omelette", &["egg"])],
        );

        let suggestions = suggester(store).suggest_dishes("u1").unwrap();
        assert_eq!(as_set(&suggestions), HashSet::from(["Omelette"]));
    }

    #[test]
    fn test_repeated_calls_give_same_set() {
        let store = store_with(
            &[pantry("u1", &["egg", "rice"], &[days_from_now(1), days_from_now(2)])],
            &[
                DishRecord::new("Omelette", &["egg"]),
                DishRecord::new("Fried Rice", &["rice", "egg"]),
                DishRecord::new("Congee", &["rice"]),
            ],
        );
        let suggester = suggester(store);

        let first = suggester.suggest_dishes("u1").unwrap();
        let second = suggester.suggest_dishes("u1").unwrap();
        assert_eq!(as_set(&first), as_set(&second));
        assert_eq!(first.suggested_dishes.len(), 3);
    }

    // ------------------------------------------------------------------------
    // Store behaviour
    // ------------------------------------------------------------------------

    /// Counts dish queries and can fail on demand
    struct ProbeStore {
        pantry: Option<UserPantryRecord>,
        fail_dish_query: bool,
        dish_queries: AtomicUsize,
    }

    impl UserStore for ProbeStore {
        fn find_pantry(&self, _user_id: &str) -> Result<Option<UserPantryRecord>> {
            Ok(self.pantry.clone())
        }
    }

    impl DishStore for ProbeStore {
        fn find_dishes_with_any_ingredient(&self, _ingredients: &[String]) -> Result<Vec<DishRecord>> {
            self.dish_queries.fetch_add(1, Ordering::SeqCst);
            if self.fail_dish_query {
                return Err(anyhow!("dish store unavailable"));
            }
            Ok(vec![DishRecord::new("Omelette", &["egg"])])
        }
    }

    fn probe(pantry: Option<UserPantryRecord>, fail_dish_query: bool) -> Arc<ProbeStore> {
        Arc::new(ProbeStore {
            pantry,
            fail_dish_query,
            dish_queries: AtomicUsize::new(0),
        })
    }

    fn probe_suggester(store: Arc<ProbeStore>) -> DishSuggester<ProbeStore> {
        DishSuggester::with_clock(store, ExpiryWindow::default(), Arc::new(FixedClock(now())))
    }

    #[test]
    fn test_dish_store_untouched_when_nothing_to_match() {
        let missing = probe(None, false);
        assert!(probe_suggester(missing.clone()).suggest_dishes("ghost").is_err());
        assert_eq!(missing.dish_queries.load(Ordering::SeqCst), 0);

        let stale = probe(Some(pantry("u1", &["egg"], &[days_from_now(-1)])), false);
        probe_suggester(stale.clone()).suggest_dishes("u1").unwrap();
        assert_eq!(stale.dish_queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_store_failure_propagates() {
        let store = probe(Some(pantry("u1", &["egg"], &[days_from_now(1)])), true);

        let result = probe_suggester(store.clone()).suggest_dishes("u1");
        assert!(matches!(result, Err(SuggestError::Store(_))));
        assert_eq!(store.dish_queries.load(Ordering::SeqCst), 1);
    }
}
