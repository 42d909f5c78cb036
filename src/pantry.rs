// Pantry management: list, append, and delete items on a user's pantry

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::UserPantryRecord;
use crate::store::PantryStore;

#[derive(Error, Debug)]
pub enum PantryError {
    #[error("User not found")]
    UserNotFound,

    #[error("items and expiry_dates must have the same length ({items} vs {expiry_dates})")]
    LengthMismatch { items: usize, expiry_dates: usize },

    #[error("user_id and item are required")]
    MissingField,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub struct PantryService<S> {
    store: Arc<S>,
}

impl<S: PantryStore> PantryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_pantry(&self, user_id: &str) -> Result<UserPantryRecord, PantryError> {
        self.store
            .find_pantry(user_id)?
            .ok_or(PantryError::UserNotFound)
    }

    /// Append items to an existing pantry. Both lists must line up so the
    /// positional pairing stays intact.
    pub fn add_items(
        &self,
        user_id: &str,
        items: &[String],
        expiry_dates: &[String],
    ) -> Result<UserPantryRecord, PantryError> {
        if items.len() != expiry_dates.len() {
            return Err(PantryError::LengthMismatch {
                items: items.len(),
                expiry_dates: expiry_dates.len(),
            });
        }

        let record = self
            .store
            .append_items(user_id, items, expiry_dates)?
            .ok_or(PantryError::UserNotFound)?;

        info!(user_id, added = items.len(), total = record.ingredients.len(), "Added pantry items");

        Ok(record)
    }

    /// Delete the first occurrence of `item`. Deleting an item that is not
    /// in the pantry still succeeds; the return value says whether anything changed.
    pub fn delete_item(&self, user_id: &str, item: &str) -> Result<bool, PantryError> {
        if user_id.is_empty() || item.is_empty() {
            return Err(PantryError::MissingField);
        }

        let removed = self
            .store
            .remove_item(user_id, item)?
            .ok_or(PantryError::UserNotFound)?;

        info!(user_id, item, removed, "Deleted pantry item");

        Ok(removed)
    }
}
