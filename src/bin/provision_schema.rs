use travelling_db_admin::cli::{self, Args};
use travelling_db_admin::db::mongo;
use travelling_db_admin::services::schema_service;
use travelling_db_admin::AdminError;

const USAGE: &str = "\
Create the application collections and indexes. Safe to run repeatedly.

Usage: provision-schema [--database <name>]

Environment: MONGODB_URI, MONGODB_DATABASE, MONGODB_TIMEOUT_SECS";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::exit_on_error(run().await);
}

async fn run() -> Result<(), AdminError> {
    let args = Args::from_env(&[], &["database"])?;
    if args.wants_help() {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = cli::load_config(&args)?;
    let db = mongo::connect(&config).await?;

    println!("Provisioning database: {}", config.database);
    let report = schema_service::provision(&db).await?;

    for name in &report.created_collections {
        println!("Created collection: {}", name);
    }
    for name in &report.existing_collections {
        println!("Collection already present: {}", name);
    }
    println!("Indexes ensured: {}", report.indexes_ensured);
    println!("Schema provisioning completed");

    Ok(())
}
