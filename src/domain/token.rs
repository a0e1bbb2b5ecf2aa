use crate::domain::session::SessionUser;
use crate::error::{AppError, Result};
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims the storefront API embeds in its access tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl AccessClaims {
    /// `userId`, then `id`, then empty.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.user_id.as_deref().or(self.id.as_deref()).unwrap_or_default()
    }

    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn to_user(&self) -> SessionUser {
        SessionUser { id: self.subject().to_string(), role: self.role().to_string(), email: self.email.clone() }
    }

    /// Reads the payload segment without checking the signature or expiry.
    ///
    /// Only the console server's edge guard can check signatures; everything
    /// else trusts the claims the API handed back over TLS.
    ///
    /// # Errors
    /// Returns `AppError::InvalidResponse` if the token is not a well-formed JWT.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(AppError::InvalidResponse("Invalid access token".into())),
        };

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| AppError::InvalidResponse("Invalid access token".into()))?;

        serde_json::from_slice(&bytes).map_err(|_| AppError::InvalidResponse("Invalid access token".into()))
    }
}

/// Verifies HS256 access tokens with the secret shared with the storefront API.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is enforced when present, with no clock tolerance.
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        Self { key: DecodingKey::from_secret(secret.as_bytes()), validation }
    }

    /// # Errors
    /// Returns the `jsonwebtoken` error when the signature, algorithm or expiry check fails.
    pub fn verify(&self, token: &str) -> std::result::Result<AccessClaims, jsonwebtoken::errors::Error> {
        decode::<AccessClaims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}
