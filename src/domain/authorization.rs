//! The allow/deny policy shared by the edge guard and the client guard.
//!
//! Both guards ask the same question through [`authorize`]; they differ only in
//! where the credential comes from. The edge guard verifies the mirrored cookie
//! cryptographically, the client guard trusts the hydrated session it holds.

use crate::domain::session::{ADMIN_ROLE, AuthSession};
use crate::domain::token::TokenVerifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
}

/// Identity a credential source vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: String,
}

pub trait CredentialSource {
    /// Returns the principal, or `None` when the credential is absent or unusable.
    fn principal(&self) -> Option<Principal>;
}

#[must_use]
pub fn authorize<S: CredentialSource + ?Sized>(source: &S) -> Decision {
    match source.principal() {
        Some(principal) if principal.role == ADMIN_ROLE => Decision::Allow,
        Some(principal) => {
            tracing::warn!(user_id = %principal.user_id, role = %principal.role, "Unauthorized access attempt by non-admin user");
            Decision::RedirectToLogin
        }
        None => Decision::RedirectToLogin,
    }
}

/// Token read from the `accessToken` cookie, verified before it is trusted.
#[derive(Debug)]
pub struct VerifiedCookie<'a> {
    pub token: Option<&'a str>,
    pub verifier: &'a TokenVerifier,
}

impl CredentialSource for VerifiedCookie<'_> {
    fn principal(&self) -> Option<Principal> {
        let token = self.token.filter(|t| !t.is_empty())?;
        match self.verifier.verify(token) {
            Ok(claims) => Some(Principal { user_id: claims.subject().to_string(), role: claims.role().to_string() }),
            Err(e) => {
                tracing::debug!(error = %e, "JWT verification failed");
                None
            }
        }
    }
}

/// The in-memory session, as hydrated from storage.
#[derive(Debug)]
pub struct SessionCredential<'a>(pub Option<&'a AuthSession>);

impl CredentialSource for SessionCredential<'_> {
    fn principal(&self) -> Option<Principal> {
        self.0.map(|session| Principal { user_id: session.user.id.clone(), role: session.user.role.clone() })
    }
}
