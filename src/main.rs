use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use zero_waste_kitchen::{import_dishes, import_pantries, logging, Config, SqliteStore};

const USAGE: &str = "Usage:
  zero-waste-kitchen import-dishes <dishes.csv>
  zero-waste-kitchen import-pantry <pantry.csv>";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = Config::load()?;
    logging::init_logger(config.log_json);

    match (args.get(1).map(String::as_str), args.get(2)) {
        (Some("import-dishes"), Some(csv_path)) => run_import_dishes(&config, Path::new(csv_path)),
        (Some("import-pantry"), Some(csv_path)) => run_import_pantry(&config, Path::new(csv_path)),
        _ => {
            eprintln!("{USAGE}");
            bail!("Unknown or incomplete command");
        }
    }
}

fn run_import_dishes(config: &Config, csv_path: &Path) -> Result<()> {
    println!("🍲 Importing dishes into {:?}", config.db_path);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteStore::open(&config.db_path)?;
    let summary = import_dishes(&store, csv_path)?;
    let total = store.dish_count()?;

    println!("✓ Read {} dishes from {:?}", summary.read, csv_path);
    println!("✓ Inserted {} new dishes", summary.stored);
    println!("✓ Skipped duplicates: {}", summary.read - summary.stored);
    println!("✓ Database contains {} dishes", total);

    Ok(())
}

fn run_import_pantry(config: &Config, csv_path: &Path) -> Result<()> {
    println!("🧺 Importing pantries into {:?}", config.db_path);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteStore::open(&config.db_path)?;
    let summary = import_pantries(&store, csv_path)?;
    let total = store.pantry_count()?;

    println!("✓ Replaced pantries for {} users from {:?}", summary.stored, csv_path);
    println!("✓ Database contains {} pantries", total);

    Ok(())
}
