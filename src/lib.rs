// Zero Waste Kitchen - Core Library
// Exposes all modules for use in the import CLI, API server, and tests

pub mod config;
pub mod db;
pub mod freshness;
pub mod import;
pub mod logging;
pub mod models;
pub mod pantry;
pub mod store;
pub mod suggest;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{setup_database, SqliteStore};
pub use freshness::{
    format_expiry_date, parse_expiry_date, Clock, ExpiryWindow, FixedClock, SystemClock, DEFAULT_WINDOW_DAYS,
    EXPIRY_DATE_FORMAT,
};
pub use import::{import_dishes, import_pantries, load_dishes_csv, load_pantries_csv, ImportSummary};
pub use models::{DishRecord, UserPantryRecord};
pub use pantry::{PantryError, PantryService};
pub use store::{DishStore, PantryStore, UserStore};
pub use suggest::{DishSuggester, DishSuggestions, SuggestError, NO_VALID_INGREDIENTS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
