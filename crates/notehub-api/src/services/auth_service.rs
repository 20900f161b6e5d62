//! Account registration, login and profile lookup.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use notehub_core::validation::validate_registration;
use notehub_core::{
    normalize_email, Error, NewUser, PublicUser, Result, UserRepository, UserSummary,
};
use notehub_crypto::{PasswordHasher, TokenSigner};
use notehub_db::Database;

/// Same message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Hash checked when the email is unknown, so both failures cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordHasher::default().hash("notehub-timing-guard").ok());

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token plus the user snapshot the client keeps in its session.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    passwords: PasswordHasher,
    tokens: Arc<TokenSigner>,
    institution_domain: Option<String>,
}

impl AuthService {
    pub fn new(
        db: Database,
        passwords: PasswordHasher,
        tokens: Arc<TokenSigner>,
        institution_domain: Option<String>,
    ) -> Self {
        Self {
            db,
            passwords,
            tokens,
            institution_domain,
        }
    }

    /// Create an account. A taken email is `Conflict` and writes nothing.
    pub async fn register(&self, req: RegisterRequest) -> Result<Uuid> {
        validate_registration(
            &req.email,
            &req.password,
            &req.full_name,
            self.institution_domain.as_deref(),
        )?;
        let email = normalize_email(&req.email);

        if self.db.users.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("Email already in use".to_string()));
        }

        let password_hash = self.hash_password(req.password).await?;
        let user = self
            .db
            .users
            .insert(NewUser {
                email,
                password_hash,
                full_name: req.full_name.trim().to_string(),
            })
            .await?;

        info!(
            subsystem = "auth",
            component = "accounts",
            op = "register",
            user_id = %user.id,
            "User registered"
        );
        Ok(user.id)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        let email = normalize_email(&req.email);
        let user = self.db.users.find_by_email(&email).await?;

        let (stored_hash, user) = match user {
            Some(user) => (Some(user.password_hash.clone()), Some(user)),
            None => (DUMMY_HASH.clone(), None),
        };
        let matches = match stored_hash {
            Some(hash) => self.verify_password(req.password, hash).await?,
            None => false,
        };

        let user = match (user, matches) {
            (Some(user), true) => user,
            _ => {
                warn!(
                    subsystem = "auth",
                    component = "accounts",
                    op = "login",
                    "Rejected login"
                );
                return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let token = self
            .tokens
            .issue(user.id, &user.email)
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!(
            subsystem = "auth",
            component = "accounts",
            op = "login",
            user_id = %user.id,
            "User logged in"
        );
        Ok(LoginResponse {
            token,
            user: user.to_summary(),
        })
    }

    /// The caller's account without the password hash.
    pub async fn profile(&self, user_id: Uuid) -> Result<PublicUser> {
        self.db
            .users
            .fetch(user_id)
            .await?
            .map(|u| u.to_public())
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    // Argon2 is CPU bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.passwords.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
            .map_err(|e| Error::Internal(e.to_string()))
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool> {
        let hasher = self.passwords.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                // An unreadable stored hash can never match.
                warn!(subsystem = "auth", error = %e, "Stored password hash is invalid");
                Ok(false)
            }
        }
    }
}
