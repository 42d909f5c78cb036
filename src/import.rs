// 📥 CSV Import - seed the dish collection and user pantries
//
// dishes.csv:  name,ingredients        (ingredients separated by ';')
// pantry.csv:  user_id,ingredient,expiry_date   (one row per item)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::db::SqliteStore;
use crate::freshness::parse_expiry_date;
use crate::models::{DishRecord, UserPantryRecord};
use crate::store::PantryStore;

pub const INGREDIENT_SEPARATOR: char = ';';

#[derive(Debug, Deserialize)]
struct DishRow {
    name: String,
    #[serde(default)]
    ingredients: String,
}

#[derive(Debug, Deserialize)]
struct PantryRow {
    user_id: String,
    ingredient: String,
    expiry_date: String,
}

pub fn load_dishes_csv(csv_path: &Path) -> Result<Vec<DishRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open dishes CSV file")?;

    let mut dishes = Vec::new();

    for result in rdr.deserialize() {
        let row: DishRow = result.context("Failed to deserialize dish")?;

        let ingredients: Vec<String> = row
            .ingredients
            .split(INGREDIENT_SEPARATOR)
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        if ingredients.is_empty() {
            warn!(dish = %row.name, "Dish has no ingredients and can never be suggested");
        }

        dishes.push(DishRecord {
            name: row.name.trim().to_string(),
            ingredients,
        });
    }

    Ok(dishes)
}

/// Rows are grouped per user in file order; each user appears once in the output
pub fn load_pantries_csv(csv_path: &Path) -> Result<Vec<UserPantryRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open pantry CSV file")?;

    let mut pantries: Vec<UserPantryRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in rdr.deserialize() {
        let row: PantryRow = result.context("Failed to deserialize pantry item")?;
        let expiry_date = row.expiry_date.trim().to_string();

        if parse_expiry_date(&expiry_date).is_none() {
            warn!(
                user_id = %row.user_id,
                ingredient = %row.ingredient,
                expiry_date = %expiry_date,
                "Expiry date is not DD-MM-YYYY, item will never be suggested"
            );
        }

        let slot = *index.entry(row.user_id.clone()).or_insert_with(|| {
            pantries.push(UserPantryRecord::new(&row.user_id));
            pantries.len() - 1
        });

        let pantry = &mut pantries[slot];
        pantry.ingredients.push(row.ingredient.trim().to_string());
        pantry.expiry_dates.push(expiry_date);
    }

    Ok(pantries)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub read: usize,
    pub stored: usize,
}

/// Load dishes from CSV and insert the ones not already present
pub fn import_dishes(store: &SqliteStore, csv_path: &Path) -> Result<ImportSummary> {
    let dishes = load_dishes_csv(csv_path)?;
    let stored = store.insert_dishes(&dishes)?;

    Ok(ImportSummary {
        read: dishes.len(),
        stored,
    })
}

/// Load pantries from CSV, replacing each listed user's pantry
pub fn import_pantries<S: PantryStore>(store: &S, csv_path: &Path) -> Result<ImportSummary> {
    let pantries = load_pantries_csv(csv_path)?;

    for pantry in &pantries {
        store
            .save_pantry(pantry)
            .with_context(|| format!("Failed to save pantry for {}", pantry.user_id))?;
    }

    Ok(ImportSummary {
        read: pantries.len(),
        stored: pantries.len(),
    })
}
