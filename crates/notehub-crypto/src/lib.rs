//! # notehub-crypto
//!
//! Credential primitives for NoteHub.
//!
//! - **Password storage**: Argon2id PHC strings
//! - **Bearer tokens**: compact HS256 tokens (HMAC-SHA256) carrying the user
//!   id and email, with a fixed lifetime
//!
//! Secrets are held in zeroizing buffers and redacted from `Debug` output.

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{HashParams, PasswordHasher};
pub use token::{TokenClaims, TokenSigner, MIN_SECRET_LENGTH};
