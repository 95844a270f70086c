pub mod admin_service;
pub mod booking_service;
pub mod schema_service;
pub mod seed_service;

use crate::error::AdminError;

/// Environment guard that confirms a destructive run without the CLI flag.
pub const CONFIRM_DESTRUCTIVE_ENV: &str = "TRAVELLING_ADMIN_CONFIRM_DESTRUCTIVE";

/// Proof that an operator explicitly asked for an irreversible operation.
/// Functions that delete data take a reference to one, so they cannot be
/// reached by accident from a non-destructive code path.
#[derive(Debug)]
pub struct DestructiveConfirmation {
    _private: (),
}

impl DestructiveConfirmation {
    /// `flag` is the `--confirm-destructive` switch, `env_value` the value of
    /// `TRAVELLING_ADMIN_CONFIRM_DESTRUCTIVE` if set.
    pub fn from_operator(
        flag: bool,
        env_value: Option<&str>,
        operation: &'static str,
    ) -> Result<Self, AdminError> {
        let env_confirmed = env_value
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1"))
            .unwrap_or(false);

        if flag || env_confirmed {
            log::warn!("Destructive operation confirmed: {}", operation);
            Ok(Self { _private: () })
        } else {
            Err(AdminError::ConfirmationRequired(operation))
        }
    }
}
