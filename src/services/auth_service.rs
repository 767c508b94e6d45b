//! Authentication service: signup, login and token refresh with HS256 JWTs.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user_service::create_account;
use crate::config::{Config, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{normalize_email, CreateUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;
use crate::jobs::{EmailJob, JobDispatcher};

/// Which half of the token pair a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned by login and refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and queue the welcome email.
    async fn signup(&self, input: CreateUser) -> AppResult<User>;

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Exchange a refresh token for a new pair.
    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse>;

    /// Verify an access token; refresh tokens are rejected.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    jobs: Arc<dyn JobDispatcher>,
    config: Arc<Config>,
}

impl Authenticator {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobDispatcher>,
        config: Arc<Config>,
    ) -> Self {
        Self { repo, jobs, config }
    }

    fn sign(&self, user: &User, kind: TokenKind, lifetime: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            kind,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key_bytes()),
        )?)
    }

    fn issue_pair(&self, user: &User) -> AppResult<TokenResponse> {
        let access_minutes = self.config.access_token_expire_minutes;

        Ok(TokenResponse {
            access_token: self.sign(user, TokenKind::Access, Duration::minutes(access_minutes))?,
            refresh_token: self.sign(
                user,
                TokenKind::Refresh,
                Duration::days(self.config.refresh_token_expire_days),
            )?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: access_minutes * SECONDS_PER_MINUTE,
        })
    }

    fn decode_claims(&self, token: &str, expected: TokenKind) -> AppResult<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_key_bytes()),
            &Validation::default(),
        )?
        .claims;

        if claims.kind != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn signup(&self, input: CreateUser) -> AppResult<User> {
        let user = create_account(self.repo.as_ref(), input).await?;

        let welcome = EmailJob::welcome(&user, &self.config.project_name);
        if let Err(e) = self.jobs.dispatch_email(welcome).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to enqueue welcome email");
        }

        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.repo.find_by_email(&normalize_email(&email)).await?;

        // Unknown emails still pay for one hash verification
        let user = match user {
            Some(user) if Password::from_hash(user.password_hash.clone()).verify(&password) => user,
            Some(_) => return Err(AppError::InvalidCredentials),
            None => {
                Password::verify_dummy(&password);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue_pair(&user)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let claims = self.decode_claims(refresh_token, TokenKind::Refresh)?;

        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        self.issue_pair(&user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.decode_claims(token, TokenKind::Access)
    }
}
