use mongodb::error::{ErrorKind, WriteFailure};
use std::path::PathBuf;

/// Server error code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;
/// Server error code returned by `create` when the collection already exists.
pub const NAMESPACE_EXISTS_CODE: i32 = 48;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Duplicate key in '{collection}': {message}")]
    DuplicateKey { collection: String, message: String },

    #[error("No real user id supplied; pass --user-id <id> or set REAL_USER_ID")]
    MissingUserId,

    #[error("User id '{0}' is still the placeholder value; replace it with a real user id")]
    PlaceholderUserId(String),

    #[error("User id is the dummy sentinel itself; remapping it onto itself changes nothing")]
    SentinelUserId,

    #[error("No user with id '{0}' exists in the users collection")]
    UnknownUser(String),

    #[error("Refusing destructive operation without confirmation: {0}")]
    ConfirmationRequired(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read seed file {path}: {source}")]
    SeedFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid seed dataset: {0}")]
    SeedFormat(String),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("Failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl AdminError {
    /// Classifies a driver error raised while writing to `collection`,
    /// turning unique index violations into `DuplicateKey`.
    pub fn from_write(collection: &str, err: mongodb::error::Error) -> Self {
        match duplicate_key_message(&err) {
            Some(message) => AdminError::DuplicateKey {
                collection: collection.to_string(),
                message,
            },
            None => AdminError::Database(err),
        }
    }
}

fn duplicate_key_message(err: &mongodb::error::Error) -> Option<String> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(write_error.message.clone())
        }
        ErrorKind::InsertMany(insert_error) => insert_error
            .write_errors
            .as_ref()
            .and_then(|errors| errors.iter().find(|e| e.code == DUPLICATE_KEY_CODE))
            .map(|e| e.message.clone()),
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
            Some(command_error.message.clone())
        }
        _ => None,
    }
}

/// True when the error says the collection being created already exists.
pub fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command_error) if command_error.code == NAMESPACE_EXISTS_CODE
    )
}
