//! User/auth service handlers, mounted at `/api/auth`.
//!
//! Login is an identity check only: it returns the user and issues no token.
//! Passwords are stored as argon2 PHC strings and never leave the service.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{MessageResponse, ValidJson, non_blank, non_empty, parse_id};
use crate::error::ApiError;
use crate::persistence::UserStore;
use crate::types::user::{User, UserRecord};

const USER_NOT_FOUND: &str = "User not found";
const FIELDS_REQUIRED: &str = "All fields are required";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only if the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

// Hashing is CPU-bound; keep it off the async workers.
async fn hash_off_thread(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal("Error hashing password", e))?
        .map_err(|e| ApiError::internal("Error hashing password", e))
}

async fn verify_off_thread(password: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))?
        .map_err(|e| ApiError::internal("Error logging in", e))
}

pub fn routes<S: UserStore>() -> Router<S> {
    Router::new()
        .route("/api/auth", get(list_users::<S>))
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route(
            "/api/auth/{id}",
            get(get_user::<S>)
                .put(update_user::<S>)
                .delete(delete_user::<S>),
        )
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Every field is optional: absent ones keep their stored value, and a new
/// password is re-hashed.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: User,
}

async fn register<S: UserStore>(
    State(store): State<S>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(body.name),
        non_blank(body.email),
        non_empty(body.password),
    ) else {
        return Err(ApiError::validation(FIELDS_REQUIRED));
    };

    let existing = store
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal("Error registering user", e))?;
    if existing.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let password_hash = hash_off_thread(password).await?;
    let record = UserRecord::new(name, email, password_hash);
    store
        .insert_user(&record)
        .await
        .map_err(|e| ApiError::internal("Error registering user", e))?;
    info!(user_id = %record.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User registered successfully",
            user: record.into(),
        }),
    ))
}

async fn login<S: UserStore>(
    State(store): State<S>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let (Some(email), Some(password)) = (non_blank(body.email), non_empty(body.password)) else {
        return Err(ApiError::validation(FIELDS_REQUIRED));
    };

    let record = store
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    if !verify_off_thread(password, record.password_hash.clone()).await? {
        warn!(user_id = %record.id, "login rejected: invalid credentials");
        return Err(ApiError::validation("Invalid credentials"));
    }

    Ok(Json(UserEnvelope {
        message: "Login successful",
        user: record.into(),
    }))
}

async fn list_users<S: UserStore>(State(store): State<S>) -> Result<Json<Vec<User>>, ApiError> {
    let users = store
        .list_users()
        .await
        .map_err(|e| ApiError::internal("Error retrieving users", e))?;
    Ok(Json(users.into_iter().map(User::from).collect()))
}

async fn get_user<S: UserStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, USER_NOT_FOUND)?;
    store
        .get_user(id)
        .await
        .map_err(|e| ApiError::internal("Error retrieving user", e))?
        .map(|record| Json(record.into()))
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

async fn update_user<S: UserStore>(
    State(store): State<S>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, USER_NOT_FOUND)?;
    let current = store
        .get_user(id)
        .await
        .map_err(|e| ApiError::internal("Error updating user", e))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    let name = body.name.unwrap_or(current.name);
    let email = body.email.unwrap_or_else(|| current.email.clone());

    if email != current.email {
        let taken = store
            .find_user_by_email(&email)
            .await
            .map_err(|e| ApiError::internal("Error updating user", e))?
            .is_some_and(|other| other.id != id);
        if taken {
            return Err(ApiError::conflict("User already exists with this email"));
        }
    }

    let password_hash = match non_empty(body.password) {
        Some(password) => hash_off_thread(password).await?,
        None => current.password_hash,
    };

    let record = store
        .replace_user(id, &name, &email, &password_hash)
        .await
        .map_err(|e| ApiError::internal("Error updating user", e))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
    info!(user_id = %record.id, "user updated");
    Ok(Json(record.into()))
}

async fn delete_user<S: UserStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, USER_NOT_FOUND)?;
    let removed = store
        .delete_user(id)
        .await
        .map_err(|e| ApiError::internal("Error deleting user", e))?;
    if !removed {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
