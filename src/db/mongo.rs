use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};

use crate::config::AdminConfig;
use crate::error::AdminError;

pub async fn create_mongo_client(config: &AdminConfig) -> Result<Client, AdminError> {
    log::info!("Connecting to MongoDB: {}", redact_uri(&config.mongo_uri));

    let mut client_options = ClientOptions::parse(&config.mongo_uri).await?;

    // Admin runs are short and interactive, a small pool is plenty
    client_options.connect_timeout = Some(config.timeout);
    client_options.server_selection_timeout = Some(config.timeout);
    client_options.max_pool_size = Some(4);
    client_options.min_pool_size = Some(1);
    client_options.app_name = Some("travelling-db-admin".to_string());

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    Ok(Client::with_options(client_options)?)
}

/// Connects and returns the configured database after a successful ping.
/// Unlike a long-running service, an admin run cannot do anything useful
/// without the server, so a failed ping is an error.
pub async fn connect(config: &AdminConfig) -> Result<Database, AdminError> {
    let client = create_mongo_client(config).await?;
    let database = client.database(&config.database);

    ping(&database).await?;
    log::info!("Connected to MongoDB, using database '{}'", config.database);

    Ok(database)
}

pub async fn ping(database: &Database) -> Result<(), AdminError> {
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

/// Hides the password part of a connection string before logging it.
pub fn redact_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let rest = &uri[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => {
            let credentials = &rest[..at];
            let user = credentials.split(':').next().unwrap_or("");
            format!("{}://{}:***@{}", &uri[..scheme_end], user, &rest[at + 1..])
        }
        None => uri.to_string(),
    }
}
