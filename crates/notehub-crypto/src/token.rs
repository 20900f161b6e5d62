//! Signed bearer tokens.
//!
//! Tokens use the compact JWT layout with HS256:
//! `base64url(header) . base64url(claims) . base64url(hmac_sha256)`.
//! Claims carry the user id (`sub`), email, issue time and expiry in Unix
//! seconds. A token is valid only while `now < exp`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 16;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: Uuid,
    pub email: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expires at (Unix seconds).
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a server secret.
pub struct TokenSigner {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> CryptoResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(CryptoError::WeakSecret(MIN_SECRET_LENGTH));
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> CryptoResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|_| CryptoError::WeakSecret(MIN_SECRET_LENGTH))
    }

    /// Issue a token valid for the configured lifetime from now.
    pub fn issue(&self, user_id: Uuid, email: &str) -> CryptoResult<String> {
        self.issue_at(user_id, email, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, user_id: Uuid, email: &str, now: i64) -> CryptoResult<String> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = TokenClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> CryptoResult<TokenClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, algorithm and expiry as of `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> CryptoResult<TokenClaims> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CryptoError::MalformedToken(
                "expected three segments".to_string(),
            ));
        };

        let header: Header = serde_json::from_slice(&decode_segment(header_b64)?)
            .map_err(|e| CryptoError::MalformedToken(e.to_string()))?;
        if header.alg != ALGORITHM {
            return Err(CryptoError::UnsupportedAlgorithm(header.alg));
        }

        let signature = decode_segment(sig_b64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CryptoError::InvalidSignature)?;

        let claims: TokenClaims = serde_json::from_slice(&decode_segment(claims_b64)?)
            .map_err(|e| CryptoError::MalformedToken(e.to_string()))?;
        if now >= claims.exp {
            return Err(CryptoError::Expired);
        }
        Ok(claims)
    }
}

fn decode_segment(segment: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CryptoError::MalformedToken(e.to_string()))
}
