use std::path::Path;

use travelling_db_admin::cli::{self, Args};
use travelling_db_admin::db::{collections, mongo};
use travelling_db_admin::services::seed_service::{self, BuiltinDataset, LoadStrategy, SeedDataset};
use travelling_db_admin::services::{schema_service, DestructiveConfirmation, CONFIRM_DESTRUCTIVE_ENV};
use travelling_db_admin::AdminError;

const USAGE: &str = "\
Provision the schema and load sample data.

Usage: seed-data [--dataset sample|world] [--file <path>] [--upsert]
                 [--reset --confirm-destructive] [--database <name>]

  --dataset               built-in dataset to load (default: sample)
  --file                  load a JSON dataset from disk instead
  --upsert                update records matched by natural key instead of
                          inserting duplicates on rerun
  --reset                 drop all application collections first
  --confirm-destructive   required with --reset (or set
                          TRAVELLING_ADMIN_CONFIRM_DESTRUCTIVE=yes)

Environment: MONGODB_URI, MONGODB_DATABASE, MONGODB_TIMEOUT_SECS";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::exit_on_error(run().await);
}

async fn run() -> Result<(), AdminError> {
    let args = Args::from_env(
        &["upsert", "reset", "confirm-destructive"],
        &["database", "dataset", "file"],
    )?;
    if args.wants_help() {
        println!("{}", USAGE);
        return Ok(());
    }

    // Everything that can be checked offline is checked before connecting
    let dataset = match args.option("file") {
        Some(path) => SeedDataset::from_path(Path::new(path))?,
        None => {
            let name = args.option("dataset").unwrap_or("sample");
            BuiltinDataset::from_name(name)
                .ok_or_else(|| AdminError::Config(format!("unknown dataset '{}'", name)))?
                .load()?
        }
    };

    let confirmation = if args.flag("reset") {
        let env_value = std::env::var(CONFIRM_DESTRUCTIVE_ENV).ok();
        Some(DestructiveConfirmation::from_operator(
            args.flag("confirm-destructive"),
            env_value.as_deref(),
            "drop all application collections before seeding",
        )?)
    } else {
        None
    };

    let strategy = if args.flag("upsert") {
        LoadStrategy::Upsert
    } else {
        LoadStrategy::Insert
    };

    let config = cli::load_config(&args)?;
    let db = mongo::connect(&config).await?;
    println!("Seeding database: {}", config.database);

    if let Some(confirmation) = &confirmation {
        schema_service::reset(&db, confirmation).await?;
        println!("Cleared old data");
    }

    let provisioned = schema_service::provision(&db).await?;
    println!(
        "Collections and indexes ready ({} created, {} indexes)",
        provisioned.created_collections.len(),
        provisioned.indexes_ensured
    );

    let report = seed_service::seed(&db, &dataset, strategy).await?;

    println!("Destinations by category:");
    for (category, count) in dataset.category_counts() {
        println!("- {}: {}", category, count);
    }

    println!("Database setup completed!");
    println!("- Database: {}", config.database);
    println!("- Collections: {}", collections::ALL.join(", "));
    println!(
        "- Sample data: {} destinations, {} users, {} bookings, {} reviews, {} favorites",
        report.destinations, report.users, report.bookings, report.reviews, report.favorites
    );

    Ok(())
}
