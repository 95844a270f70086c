use travelling_db_admin::cli::{self, Args};
use travelling_db_admin::db::mongo;
use travelling_db_admin::services::admin_service::{
    self, AccountPreset, BootstrapMode, PasswordStorage,
};
use travelling_db_admin::services::{DestructiveConfirmation, CONFIRM_DESTRUCTIVE_ENV};
use travelling_db_admin::AdminError;

const USAGE: &str = "\
Create or refresh the administrator account.

Usage: bootstrap-admin [--account admin|test] [--email <email>] [--password <pw>]
                       [--hash-password] [--replace-all-users --confirm-destructive]
                       [--database <name>]

By default only the user with the account's email is inserted or updated.
--replace-all-users deletes EVERY user first and needs --confirm-destructive
(or TRAVELLING_ADMIN_CONFIRM_DESTRUCTIVE=yes).

The password is stored as supplied and hashed by the backend on first
sign-in, unless --hash-password is given.

Environment: ADMIN_EMAIL, ADMIN_PASSWORD, MONGODB_URI, MONGODB_DATABASE";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::exit_on_error(run().await);
}

async fn run() -> Result<(), AdminError> {
    let args = Args::from_env(
        &["hash-password", "replace-all-users", "confirm-destructive"],
        &["database", "account", "email", "password"],
    )?;
    if args.wants_help() {
        println!("{}", USAGE);
        return Ok(());
    }

    let preset_name = args.option("account").unwrap_or("admin");
    let preset = AccountPreset::from_name(preset_name)
        .ok_or_else(|| AdminError::Config(format!("unknown account preset '{}'", preset_name)))?;

    let email = args
        .option("email")
        .map(str::to_string)
        .or_else(|| std::env::var("ADMIN_EMAIL").ok());
    let password = args
        .option("password")
        .map(str::to_string)
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok());
    let account = preset.template().with_overrides(email, password);

    let storage = if args.flag("hash-password") {
        PasswordStorage::Bcrypt
    } else {
        PasswordStorage::AsSupplied
    };

    // Resolve the confirmation before touching the database
    let confirmation = if args.flag("replace-all-users") {
        let env_value = std::env::var(CONFIRM_DESTRUCTIVE_ENV).ok();
        Some(DestructiveConfirmation::from_operator(
            args.flag("confirm-destructive"),
            env_value.as_deref(),
            "delete every document in the users collection",
        )?)
    } else {
        None
    };
    let mode = match &confirmation {
        Some(confirmation) => BootstrapMode::ReplaceAllUsers(confirmation),
        None => BootstrapMode::UpsertByEmail,
    };

    let config = cli::load_config(&args)?;
    let db = mongo::connect(&config).await?;

    let report = admin_service::bootstrap_account(&db, account, storage, mode).await?;

    println!("User account ready: {}", report.account_id);
    println!("Email: {}", report.email);
    if report.password_hashed {
        println!("Password: stored as bcrypt hash");
    } else {
        println!("Password: stored as supplied, the backend hashes it on first sign-in");
    }
    if report.removed_users > 0 {
        println!("Removed {} previous users", report.removed_users);
    }
    println!("Admin bootstrap completed");

    Ok(())
}
