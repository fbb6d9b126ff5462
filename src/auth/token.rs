//! Signed session tokens with sealed claims.
//!
//! The outer token is a standard HS256 JWT; the inner claims
//! (username, roles) travel as `enc_data`: AES-256-GCM ciphertext
//! with the 12-byte nonce prepended, base64-encoded.

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

const NONCE_LEN: usize = 12;
const MIN_SIGNING_KEY_LEN: usize = 32;
const ENCRYPTION_KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing key must be at least {MIN_SIGNING_KEY_LEN} bytes")]
    SigningKeyTooShort,
    #[error("encryption key must be exactly {ENCRYPTION_KEY_LEN} bytes")]
    BadEncryptionKeyLength,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed claims")]
    MalformedClaims,
    #[error("claims decryption failed")]
    DecryptFailed,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    enc_data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct InnerClaims {
    username: String,
    roles: Vec<String>,
}

/// The materialised result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cipher: Aes256Gcm,
    validation: Validation,
}

impl TokenManager {
    pub fn new(signing_key: &[u8], encryption_key: &[u8]) -> Result<Self, TokenError> {
        if signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(TokenError::SigningKeyTooShort);
        }
        if encryption_key.len() != ENCRYPTION_KEY_LEN {
            return Err(TokenError::BadEncryptionKeyLength);
        }
        let cipher = Aes256Gcm::new_from_slice(encryption_key)
            .map_err(|_| TokenError::BadEncryptionKeyLength)?;

        // Expiry is checked manually against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
            cipher,
            validation,
        })
    }

    pub fn mint(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> Result<String, TokenError> {
        self.mint_at(user_id, username, roles, Utc::now().timestamp())
    }

    /// Mints a token issued at `iat`, expiring 24 hours later.
    pub fn mint_at(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
        iat: i64,
    ) -> Result<String, TokenError> {
        let inner = InnerClaims {
            username: username.to_string(),
            roles: roles.to_vec(),
        };
        let plaintext =
            serde_json::to_vec(&inner).map_err(|_| TokenError::MalformedClaims)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|_| TokenError::DecryptFailed)?;
        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);

        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
            enc_data: BASE64.encode(sealed),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::MalformedClaims)
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Signature, expiry, seal and shape checks, in that order.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName => TokenError::BadSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::MalformedClaims,
            }
        })?;
        let claims = data.claims;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        let sealed = BASE64
            .decode(&claims.enc_data)
            .map_err(|_| TokenError::DecryptFailed)?;
        if sealed.len() <= NONCE_LEN {
            return Err(TokenError::DecryptFailed);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenError::DecryptFailed)?;
        let inner: InnerClaims =
            serde_json::from_slice(&plaintext).map_err(|_| TokenError::MalformedClaims)?;
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| TokenError::MalformedClaims)?;

        Ok(TokenClaims {
            user_id,
            username: inner.username,
            roles: inner.roles,
            iat: claims.iat,
            exp: claims.exp,
        })
    }
}
