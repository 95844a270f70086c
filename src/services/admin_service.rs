use chrono::NaiveDate;
use mongodb::{
    bson::{doc, DateTime, Document},
    Database,
};

use crate::db::collections;
use crate::error::AdminError;
use crate::models::user::{User, ROLE_ADMIN, ROLE_USER};
use crate::services::seed_service::{id_string, load_records, LoadStrategy};
use crate::services::DestructiveConfirmation;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@travelling.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_TEST_EMAIL: &str = "test@test.com";
const DEFAULT_TEST_PASSWORD: &str = "test123";

/// The password is rewritten on every run; these lists belong to the app.
const ACCOUNT_INSERT_ONLY: [&str; 2] = ["favorites", "bookings"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountPreset {
    Admin,
    Test,
}

impl AccountPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(AccountPreset::Admin),
            "test" => Some(AccountPreset::Test),
            _ => None,
        }
    }

    pub fn template(self) -> AccountTemplate {
        match self {
            AccountPreset::Admin => AccountTemplate {
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
                full_name: "Admin User".to_string(),
                address: "Admin Address".to_string(),
                role: ROLE_ADMIN,
            },
            AccountPreset::Test => AccountTemplate {
                email: DEFAULT_TEST_EMAIL.to_string(),
                password: DEFAULT_TEST_PASSWORD.to_string(),
                full_name: "Test User".to_string(),
                address: "Test Address".to_string(),
                role: ROLE_USER,
            },
        }
    }
}

/// The account written by the bootstrapper. Profile fields other than these
/// get fixed defaults.
#[derive(Debug, Clone)]
pub struct AccountTemplate {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub address: String,
    pub role: &'static str,
}

impl AccountTemplate {
    pub fn with_overrides(mut self, email: Option<String>, password: Option<String>) -> Self {
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(password) = password {
            self.password = password;
        }
        self
    }

    fn validate(&self) -> Result<(), AdminError> {
        if !self.email.contains('@') {
            return Err(AdminError::Config(format!("'{}' is not an email address", self.email)));
        }
        if self.password.is_empty() {
            return Err(AdminError::Config("password must not be empty".to_string()));
        }
        Ok(())
    }

    fn into_user(self, password: String, now: DateTime) -> User {
        User {
            id: None,
            email: self.email,
            password,
            full_name: self.full_name,
            phone: Some("0123456789".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
            gender: Some("Male".to_string()),
            address: Some(self.address),
            avatar: None,
            role: Some(self.role.to_string()),
            preferences: None,
            favorites: Vec::new(),
            bookings: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStorage {
    /// Stored verbatim; the backend hashes it when the user first signs in.
    AsSupplied,
    Bcrypt,
}

pub enum BootstrapMode<'a> {
    /// Insert the account, or update the user that already has its email.
    UpsertByEmail,
    /// Remove every user, then insert the account.
    ReplaceAllUsers(&'a DestructiveConfirmation),
}

#[derive(Debug)]
pub struct BootstrapReport {
    pub email: String,
    pub account_id: String,
    pub removed_users: u64,
    pub password_hashed: bool,
}

pub async fn bootstrap_account(
    db: &Database,
    account: AccountTemplate,
    storage: PasswordStorage,
    mode: BootstrapMode<'_>,
) -> Result<BootstrapReport, AdminError> {
    account.validate()?;

    let password = match storage {
        PasswordStorage::AsSupplied => account.password.clone(),
        PasswordStorage::Bcrypt => bcrypt::hash(&account.password, bcrypt::DEFAULT_COST)?,
    };
    let email = account.email.clone();
    let user = account.into_user(password, DateTime::now());
    let users = db.collection::<Document>(collections::USERS);

    let (account_id, removed_users) = match mode {
        BootstrapMode::UpsertByEmail => {
            let ids = load_records(
                &users,
                std::slice::from_ref(&user),
                LoadStrategy::Upsert,
                &["email"],
                &ACCOUNT_INSERT_ONLY,
            )
            .await?;
            let id = ids.first().map(id_string).unwrap_or_default();
            (id, 0)
        }
        BootstrapMode::ReplaceAllUsers(_confirmation) => {
            let existing = users.count_documents(doc! {}).await?;
            log::warn!(
                "Deleting ALL {} documents in '{}.{}' before recreating {}",
                existing,
                db.name(),
                collections::USERS,
                email
            );

            let removed = users.delete_many(doc! {}).await?.deleted_count;
            println!("Removed {} existing users", removed);

            let inserted = users
                .insert_one(bson::to_document(&user)?)
                .await
                .map_err(|e| AdminError::from_write(collections::USERS, e))?;
            (id_string(&inserted.inserted_id), removed)
        }
    };

    Ok(BootstrapReport {
        email,
        account_id,
        removed_users,
        password_hashed: storage == PasswordStorage::Bcrypt,
    })
}
