//! Password login and the user-management actions behind the
//! "Manage Users" panel.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::NaiveDateTime;
use entity::users::{self, Role};
use platform_api::ApiError;
use platform_authz::{MenuKey, PolicyContext, PolicyEngine};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Accounts created on every schema bootstrap when missing.
pub const DEFAULT_ACCOUNTS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("alif", "alif123", Role::Host),
];

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotPermitted(String),
    #[error("you cannot delete your own account")]
    SelfDelete,
}

impl From<AuthnError> for ApiError {
    fn from(value: AuthnError) -> Self {
        match value {
            AuthnError::InvalidInput(msg) => ApiError::invalid(msg),
            AuthnError::NotPermitted(msg) => ApiError::Unauthorized(msg),
            AuthnError::SelfDelete => ApiError::Unauthorized(value.to_string()),
            AuthnError::Db(_) | AuthnError::Hash(_) => ApiError::operation(value),
        }
    }
}

pub type AuthnResult<T> = Result<T, AuthnError>;

/// The signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

/// A row of the user list. The hash never leaves this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

pub fn hash_password(password: &str) -> AuthnResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthnError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            warn!(error = %err, "stored password hash is unreadable");
            false
        }
    }
}

async fn find_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> AuthnResult<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?)
}

/// `None` for an unknown user and for a wrong password alike.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> AuthnResult<Option<CurrentUser>> {
    let username = username.trim();
    let Some(user) = find_by_username(db, username).await? else {
        info!(username, "login rejected");
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash) {
        info!(username, "login rejected");
        return Ok(None);
    }
    info!(username, role = %user.role, "login succeeded");
    Ok(Some(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    }))
}

/// Insert unless the username is taken. Returns whether a row was added.
async fn insert_ignore<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
    role: Role,
) -> AuthnResult<bool> {
    let model = users::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        ..Default::default()
    };
    match users::Entity::insert(model).exec(db).await {
        Ok(_) => Ok(true),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

fn require_user_manager(subject: &str, role: Role) -> AuthnResult<()> {
    PolicyEngine
        .check(&PolicyContext {
            subject: subject.to_string(),
            role,
            resource: MenuKey::ManageUsers,
        })
        .map_err(|err| AuthnError::NotPermitted(err.to_string()))
}

/// Create an account on behalf of `requestor`. A duplicate username is not
/// an error: it yields `Ok(false)`.
pub async fn create_account<C: ConnectionTrait>(
    db: &C,
    requestor: &CurrentUser,
    username: &str,
    password: &str,
    role: &str,
) -> AuthnResult<bool> {
    require_user_manager(&requestor.username, requestor.role)?;
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthnError::InvalidInput(
            "username and password are required".into(),
        ));
    }
    let role = match role.trim() {
        "" => Role::User,
        raw => Role::parse(raw).ok_or_else(|| {
            AuthnError::InvalidInput(format!(
                "unknown role {raw:?} (expected host, admin or user)"
            ))
        })?,
    };

    let created = insert_ignore(db, username, password, role).await?;
    if created {
        info!(by = %requestor.username, username, %role, "account created");
    } else {
        info!(by = %requestor.username, username, "account already exists");
    }
    Ok(created)
}

/// Delete `username` on behalf of `requestor_username`, whose role is read
/// fresh from the database. Deleting the last admin is allowed.
pub async fn delete_account<C: ConnectionTrait>(
    db: &C,
    requestor_username: &str,
    username: &str,
) -> AuthnResult<bool> {
    let Some(requestor) = find_by_username(db, requestor_username).await? else {
        return Err(AuthnError::NotPermitted(format!(
            "unknown requestor {requestor_username:?}"
        )));
    };
    require_user_manager(&requestor.username, requestor.role)?;
    let username = username.trim();
    if requestor.username == username {
        return Err(AuthnError::SelfDelete);
    }

    let result = users::Entity::delete_many()
        .filter(users::Column::Username.eq(username))
        .exec(db)
        .await?;
    let deleted = result.rows_affected > 0;
    info!(by = %requestor.username, username, deleted, "account delete requested");
    Ok(deleted)
}

pub async fn list_accounts<C: ConnectionTrait>(db: &C) -> AuthnResult<Vec<AccountSummary>> {
    let rows = users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|user| AccountSummary {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        })
        .collect())
}

/// Returns how many default accounts were inserted.
pub async fn seed_default_accounts<C: ConnectionTrait>(db: &C) -> AuthnResult<usize> {
    let mut inserted = 0;
    for (username, password, role) in DEFAULT_ACCOUNTS {
        if insert_ignore(db, username, password, role).await? {
            warn!(username, "seeded default account; change its password");
            inserted += 1;
        }
    }
    Ok(inserted)
}
