//! Authentication service
//!
//! Credential verification with bcrypt and JWT issuance. Tokens embed
//! the user's home location and effective permission names so request
//! handling never has to re-query the role tables.

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::audit::{AuditService, NewAuditRecord};
use shared::models::AuditAction;

/// JWT claims. Mirrors the structure the auth middleware decodes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    /// The user's home location
    pub location_id: i32,
    /// Effective permission names, "resource:action"
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned by login and refresh
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(sqlx::FromRow)]
struct UserCredentials {
    id: i32,
    password_hash: String,
    location_id: i32,
    active: bool,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Verify a username/password pair and issue a token pair.
    ///
    /// Invalid username, wrong password and deactivated account all
    /// produce the same `InvalidCredentials` error.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash, location_id, active FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let permissions = self.load_permissions(user.id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        AuditService::record_in_tx(
            &mut tx,
            NewAuditRecord {
                entity_type: "Usuario".to_string(),
                entity_id: user.id,
                action: AuditAction::Login,
                description: format!("Inicio de sesión de {}", username),
                data_before: None,
                data_after: Some(json!({ "username": username })),
                user_id: user.id,
            },
        )
        .await?;

        tx.commit().await?;

        self.issue_tokens(user.id, user.location_id, permissions)
    }

    /// Exchange a valid refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = self.decode_token(refresh_token)?;
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| AppError::InvalidToken)?;

        // The account may have been deactivated since issuance
        let active = sqlx::query_scalar::<_, bool>("SELECT active FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if !active {
            return Err(AppError::InvalidCredentials);
        }

        let permissions = self.load_permissions(user_id).await?;
        self.issue_tokens(user_id, claims.location_id, permissions)
    }

    /// Profile of an authenticated user
    pub async fn me(&self, user_id: i32) -> AppResult<shared::models::User> {
        sqlx::query_as::<_, shared::models::User>(
            r#"
            SELECT id, first_name, last_name, username, email, location_id,
                   active, last_login, created_at, updated_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Effective permission names across all of the user's roles
    async fn load_permissions(&self, user_id: i32) -> AppResult<Vec<String>> {
        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT perm.name
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions perm ON perm.id = rp.permission_id
            WHERE ur.user_id = $1
            ORDER BY perm.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    fn issue_tokens(
        &self,
        user_id: i32,
        location_id: i32,
        permissions: Vec<String>,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now().timestamp();

        let access_claims = Claims {
            sub: user_id.to_string(),
            location_id,
            permissions: permissions.clone(),
            exp: now + self.access_token_expiry,
            iat: now,
        };
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            location_id,
            permissions,
            exp: now + self.refresh_token_expiry,
            iat: now,
        };

        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn decode_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }
}
