// Pantry and dish records as they live in the stores

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// USER PANTRY
// ============================================================================

/// One user's pantry: ingredient names paired by position with expiry dates.
///
/// Either list may be missing from a stored record; both decode as empty.
/// The lists are expected to have equal length but reading never enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPantryRecord {
    pub user_id: String,

    #[serde(default)]
    pub ingredients: Vec<String>,

    /// `DD-MM-YYYY` strings, index i belongs to `ingredients[i]`
    #[serde(default)]
    pub expiry_dates: Vec<String>,
}

impl UserPantryRecord {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ingredients: Vec::new(),
            expiry_dates: Vec::new(),
        }
    }

    /// Append items with their expiry dates, keeping positions aligned
    pub fn append(&mut self, items: &[String], expiry_dates: &[String]) {
        self.ingredients.extend_from_slice(items);
        self.expiry_dates.extend_from_slice(expiry_dates);
    }

    /// Remove the first occurrence of `item` and the date at the same index.
    /// Returns false if the item is not in the pantry.
    pub fn remove_first(&mut self, item: &str) -> bool {
        let Some(index) = self.ingredients.iter().position(|i| i == item) else {
            return false;
        };

        self.ingredients.remove(index);
        if index < self.expiry_dates.len() {
            self.expiry_dates.remove(index);
        }

        true
    }
}

// ============================================================================
// DISH
// ============================================================================

/// A dish and the ingredients it uses. Names are not unique across records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishRecord {
    pub name: String,

    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl DishRecord {
    pub fn new(name: &str, ingredients: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
        }
    }

    /// Compute idempotency hash for duplicate detection on import.
    /// Two records with the same name and ingredient list hash the same.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        // Length-prefixed fields, so no name/ingredient split can collide
        for field in std::iter::once(&self.name).chain(&self.ingredients) {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// TESTS
// ============================================================================
