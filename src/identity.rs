//! Opaque bearer credentials carrying `{user_id, role}`. The token value
//! itself is meaningless to callers; validation resolves it back to an
//! [`Identity`]. Validation takes an explicit instant so expiry is
//! deterministic under test.

use crate::policy::{AccessError, CredentialFault, Identity};
use crate::user::Role;
use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

const TOKEN_LEN: usize = 32;

/// Issues and validates opaque identity credentials.
pub trait IdentityProvider {
    fn issue(&self, user_id: &str, role: Role, issued_at: DateTime<Utc>) -> String;
    fn authenticate(&self, token: Option<&str>, at: DateTime<Utc>) -> Result<Identity, AccessError>;
    fn revoke(&self, token: &str);
}

struct IssuedToken {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// In-memory token table with a fixed time-to-live per credential.
pub struct TokenIssuer {
    ttl: Duration,
    tokens: Mutex<HashMap<String, IssuedToken>>,
}

impl TokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    fn random_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect()
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(Duration::hours(8))
    }
}

impl IdentityProvider for TokenIssuer {
    fn issue(&self, user_id: &str, role: Role, issued_at: DateTime<Utc>) -> String {
        let token = Self::random_token();
        let issued = IssuedToken {
            identity: Identity::new(user_id, role),
            expires_at: issued_at + self.ttl,
        };
        self.tokens
            .lock()
            .expect("token table mutex poisoned")
            .insert(token.clone(), issued);
        token
    }

    fn authenticate(&self, token: Option<&str>, at: DateTime<Utc>) -> Result<Identity, AccessError> {
        let Some(token) = token else {
            return Err(AccessError::Unauthenticated(CredentialFault::Missing));
        };
        let tokens = self.tokens.lock().expect("token table mutex poisoned");
        let Some(issued) = tokens.get(token) else {
            return Err(AccessError::Unauthenticated(CredentialFault::Unknown));
        };
        if at >= issued.expires_at {
            return Err(AccessError::Unauthenticated(CredentialFault::Expired));
        }
        Ok(issued.identity.clone())
    }

    fn revoke(&self, token: &str) {
        self.tokens
            .lock()
            .expect("token table mutex poisoned")
            .remove(token);
    }
}
