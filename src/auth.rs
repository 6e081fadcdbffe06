//! Authorization gate: registration, login and bearer-token verification
//!
//! Tokens are HS256 JWTs carrying the caller's id, username, role and display
//! name. Secrets are stored only as bcrypt hashes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Identity, LoginResponse, RegisterRequest, Role, User};
use crate::store::Repository;
use crate::AppState;

/// Lowest bcrypt cost accepted for stored secrets
pub const MIN_BCRYPT_COST: u32 = 10;

/// Token and hashing parameters
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::hours(24),
            bcrypt_cost: MIN_BCRYPT_COST,
        }
    }
}

/// JWT payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct Authenticator {
    store: Arc<dyn Repository>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Repository>, settings: &AuthSettings) -> Self {
        Self {
            store,
            encoding: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            token_ttl: settings.token_ttl,
            bcrypt_cost: settings.bcrypt_cost.max(MIN_BCRYPT_COST),
        }
    }

    /// Create an account. Unknown roles fall back to client.
    pub async fn register(&self, request: RegisterRequest) -> Result<Identity> {
        let username = request.username.trim();
        let name = request.name.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let role = Role::from_requested(request.role.as_deref());
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: self.hash_password(request.password).await?,
            role,
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::Validation("Username already exists".to_string()),
            other => other,
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, role = role.as_str(), "User registered");
        Ok(Identity::from(&user))
    }

    /// Check credentials and issue a token.
    ///
    /// The password is verified before the active flag so that the
    /// "account blocked" answer is only given to someone holding the secret.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(username, "Login rejected: bad password");
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login rejected: account blocked");
            return Err(AppError::AccountBlocked);
        }

        let token = self.issue_token(&user)?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
        Ok(LoginResponse {
            token,
            user: Identity::from(&user),
        })
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Resolve the caller from an `Authorization` header value.
    ///
    /// The account is looked up on every call, so blocking a user revokes
    /// their outstanding tokens immediately.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Identity> {
        let token = bearer_token(header)?;
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::Forbidden("Invalid or expired token".to_string())
            })?
            .claims;

        let user = self
            .store
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| AppError::Forbidden("Unknown account".to_string()))?;
        if !user.is_active {
            return Err(AppError::AccountBlocked);
        }

        Ok(Identity::from(&user))
    }

    /// Create the bootstrap admin account unless the username is taken.
    /// Returns true when an account was created.
    pub async fn seed_admin(&self, username: &str, password: &str, name: &str) -> Result<bool> {
        if self.store.find_user_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: self.hash_password(password.to_string()).await?,
            role: Role::Admin,
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.store.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, username, "Seeded admin account");
        Ok(true)
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?;

        // A malformed stored hash is treated as a mismatch
        Ok(verified.unwrap_or(false))
    }
}

/// Extract the token from `Bearer <token>`
fn bearer_token(header: Option<&str>) -> Result<&str> {
    let header =
        header.ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;
    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::Unauthenticated(
            "Malformed authorization header".to_string(),
        )),
    }
}

/// Extractor resolving the authenticated caller
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| {
                value.to_str().map_err(|_| {
                    AppError::Unauthenticated("Malformed authorization header".to_string())
                })
            })
            .transpose()?;

        state.auth.authenticate(header).await.map(AuthUser)
    }
}
