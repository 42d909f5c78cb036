use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::models::{DishRecord, UserPantryRecord};
use crate::store::{DishStore, PantryStore, UserStore};

/// SQLite-backed pantry and dish store.
///
/// Pantry lists are kept as JSON arrays so a record may carry NULL or
/// missing lists, the same shape a document store would hand back.
/// Dish ingredients are normalized into their own table for the
/// membership query.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    /// Insert dishes, skipping any whose name and ingredient list are
    /// already stored. Returns the number of new dishes.
    pub fn insert_dishes(&self, dishes: &[DishRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut inserted = 0;
        let mut duplicates = 0;

        for dish in dishes {
            let hash = dish.compute_idempotency_hash();
            let dish_uuid = uuid::Uuid::new_v4().to_string();

            let result = tx.execute(
                "INSERT INTO dishes (dish_uuid, idempotency_hash, name) VALUES (?1, ?2, ?3)",
                params![dish_uuid, hash, dish.name],
            );

            match result {
                Ok(_) => {
                    let dish_id = tx.last_insert_rowid();
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO dish_ingredients (dish_id, position, ingredient) VALUES (?1, ?2, ?3)",
                    )?;
                    for (position, ingredient) in dish.ingredients.iter().enumerate() {
                        stmt.execute(params![dish_id, position as i64, ingredient])?;
                    }
                    inserted += 1;
                }
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    duplicates += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        tx.commit()?;

        info!(inserted, duplicates, "Stored dishes");

        Ok(inserted)
    }

    pub fn dish_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM dishes", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn pantry_count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM user_pantries", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode = %mode, "Configured journal mode");

    conn.pragma_update(None, "foreign_keys", true)?;

    // ==========================================================================
    // Pantries (one row per user, lists as JSON arrays)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_pantries (
            user_id TEXT PRIMARY KEY NOT NULL,
            ingredients TEXT,
            expiry_dates TEXT,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Dishes + their ingredients
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS dishes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dish_uuid TEXT UNIQUE NOT NULL,
            idempotency_hash TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS dish_ingredients (
            dish_id INTEGER NOT NULL REFERENCES dishes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            ingredient TEXT NOT NULL,
            PRIMARY KEY (dish_id, position)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_dish_ingredients_ingredient ON dish_ingredients(ingredient)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW HELPERS
// ============================================================================

/// A NULL or malformed list column reads as an empty list
fn decode_list(raw: Option<String>, field: &str, user_id: &str) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(user_id, field, error = %e, "Unreadable pantry list, treating as empty");
        Vec::new()
    })
}

fn load_pantry(conn: &Connection, user_id: &str) -> Result<Option<UserPantryRecord>> {
    let row = conn
        .query_row(
            "SELECT ingredients, expiry_dates FROM user_pantries WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()?;

    Ok(row.map(|(ingredients, expiry_dates)| UserPantryRecord {
        user_id: user_id.to_string(),
        ingredients: decode_list(ingredients, "ingredients", user_id),
        expiry_dates: decode_list(expiry_dates, "expiry_dates", user_id),
    }))
}

fn write_pantry(conn: &Connection, record: &UserPantryRecord) -> Result<()> {
    let ingredients = serde_json::to_string(&record.ingredients)?;
    let expiry_dates = serde_json::to_string(&record.expiry_dates)?;

    conn.execute(
        "INSERT INTO user_pantries (user_id, ingredients, expiry_dates)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET
            ingredients = excluded.ingredients,
            expiry_dates = excluded.expiry_dates,
            updated_at = CURRENT_TIMESTAMP",
        params![record.user_id, ingredients, expiry_dates],
    )?;

    Ok(())
}

// ============================================================================
// STORE TRAITS
// ============================================================================

impl UserStore for SqliteStore {
    fn find_pantry(&self, user_id: &str) -> Result<Option<UserPantryRecord>> {
        let conn = self.conn()?;
        load_pantry(&conn, user_id)
    }
}

impl DishStore for SqliteStore {
    fn find_dishes_with_any_ingredient(&self, ingredients: &[String]) -> Result<Vec<DishRecord>> {
        if ingredients.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;

        // One JSON parameter keeps large pantries under SQLite's bound-variable limit
        let unique: BTreeSet<&str> = ingredients.iter().map(String::as_str).collect();
        let ingredient_set = serde_json::to_string(&unique)?;

        let mut stmt = conn.prepare_cached(
            "SELECT DISTINCT d.id, d.name
             FROM dishes d
             JOIN dish_ingredients di ON di.dish_id = d.id
             WHERE di.ingredient IN (SELECT value FROM json_each(?1))
             ORDER BY d.id",
        )?;
        let matches = stmt
            .query_map(params![ingredient_set], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ingredient_stmt = conn.prepare_cached(
            "SELECT ingredient FROM dish_ingredients WHERE dish_id = ?1 ORDER BY position",
        )?;

        let mut dishes = Vec::with_capacity(matches.len());
        for (dish_id, name) in matches {
            let dish_ingredients = ingredient_stmt
                .query_map(params![dish_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            dishes.push(DishRecord {
                name,
                ingredients: dish_ingredients,
            });
        }

        Ok(dishes)
    }
}

impl PantryStore for SqliteStore {
    fn save_pantry(&self, record: &UserPantryRecord) -> Result<()> {
        let conn = self.conn()?;
        write_pantry(&conn, record)
    }

    fn append_items(
        &self,
        user_id: &str,
        items: &[String],
        expiry_dates: &[String],
    ) -> Result<Option<UserPantryRecord>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(mut record) = load_pantry(&tx, user_id)? else {
            return Ok(None);
        };
        record.append(items, expiry_dates);
        write_pantry(&tx, &record)?;

        tx.commit()?;
        Ok(Some(record))
    }

    fn remove_item(&self, user_id: &str, item: &str) -> Result<Option<bool>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let Some(mut record) = load_pantry(&tx, user_id)? else {
            return Ok(None);
        };
        let removed = record.remove_first(item);
        if removed {
            write_pantry(&tx, &record)?;
        }

        tx.commit()?;
        Ok(Some(removed))
    }
}
