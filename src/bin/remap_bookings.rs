use travelling_db_admin::cli::{self, Args};
use travelling_db_admin::db::mongo;
use travelling_db_admin::models::bookings::DUMMY_USER_ID;
use travelling_db_admin::services::booking_service::{self, RealUserId};
use travelling_db_admin::AdminError;

const USAGE: &str = "\
Reassign bookings owned by the placeholder user 'dummy-user-id' to a real user.

Usage: remap-bookings --user-id <id> [--dry-run] [--allow-unknown-user] [--database <name>]
       remap-bookings <id>

The id may also come from REAL_USER_ID. It must exist in the users
collection unless --allow-unknown-user is given.

Environment: REAL_USER_ID, MONGODB_URI, MONGODB_DATABASE";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::exit_on_error(run().await);
}

async fn run() -> Result<(), AdminError> {
    let args = Args::from_env(&["dry-run", "allow-unknown-user"], &["database", "user-id"])?;
    if args.wants_help() {
        println!("{}", USAGE);
        return Ok(());
    }

    let from_env = std::env::var("REAL_USER_ID").ok();
    let raw = args
        .option("user-id")
        .or_else(|| args.positional(0))
        .or(from_env.as_deref());
    let user_id = RealUserId::parse(raw)?;

    let config = cli::load_config(&args)?;
    let db = mongo::connect(&config).await?;

    if args.flag("dry-run") {
        let pending = booking_service::count_dummy_bookings(&db).await?;
        println!(
            "Bookings owned by '{}' that would move to '{}': {}",
            DUMMY_USER_ID, user_id, pending
        );
        println!("Dry run completed, nothing was written");
        return Ok(());
    }

    if !args.flag("allow-unknown-user") && !booking_service::user_exists(&db, &user_id).await? {
        return Err(AdminError::UnknownUser(user_id.to_string()));
    }

    let report = booking_service::remap_dummy_bookings(&db, &user_id).await?;

    println!("Updated bookings: {}", report.modified);
    println!("Bookings now owned by {}: {}", user_id, report.now_owned);
    println!("Booking remap completed");

    Ok(())
}
