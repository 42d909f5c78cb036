// Store collaborators: pantry lookup, dish membership query, pantry writes
//
// Calls are synchronous and blocking. Implementations own their connection
// and are shared behind an `Arc` by whoever constructs them at startup.

use anyhow::Result;

use crate::models::{DishRecord, UserPantryRecord};

/// Keyed lookup of a user's pantry
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when the user has no pantry record
    fn find_pantry(&self, user_id: &str) -> Result<Option<UserPantryRecord>>;
}

/// Dish collection with a set-membership filter
pub trait DishStore: Send + Sync {
    /// Every dish whose ingredient list contains at least one of `ingredients`.
    /// Dishes sharing a name are returned as separate records.
    fn find_dishes_with_any_ingredient(&self, ingredients: &[String]) -> Result<Vec<DishRecord>>;
}

/// Write side of the pantry, used by the management endpoints and importer
pub trait PantryStore: UserStore {
    /// Create or fully replace a user's pantry
    fn save_pantry(&self, record: &UserPantryRecord) -> Result<()>;

    /// Append to an existing pantry. `Ok(None)` when the user is unknown.
    fn append_items(
        &self,
        user_id: &str,
        items: &[String],
        expiry_dates: &[String],
    ) -> Result<Option<UserPantryRecord>>;

    /// Drop the first occurrence of `item` and its paired date.
    /// `Ok(None)` when the user is unknown, otherwise whether anything was removed.
    fn remove_item(&self, user_id: &str, item: &str) -> Result<Option<bool>>;
}
