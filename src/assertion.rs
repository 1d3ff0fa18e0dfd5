use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Service account identity used to mint assertions. The key is parsed once
/// when the config is loaded.
#[derive(Clone)]
pub struct ServiceAccountCredential {
    pub client_email: String,
    pub project_id: String,
    signing_key: EncodingKey,
}

impl ServiceAccountCredential {
    pub fn from_pem(
        client_email: String,
        private_key_pem: &str,
        project_id: String,
    ) -> DispatchResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|error| {
            DispatchError::configuration(format!(
                "FIREBASE_PRIVATE_KEY is not a valid RSA key: {}",
                error
            ))
        })?;

        Ok(ServiceAccountCredential {
            client_email,
            project_id,
            signing_key,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(client_email: &str, audience: &str, issued_at: i64) -> Self {
        AssertionClaims {
            iss: client_email.to_string(),
            scope: MESSAGING_SCOPE.to_string(),
            aud: audience.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Signs a JWT-bearer assertion for `audience` (the token endpoint) with RS256.
pub fn sign_assertion(
    credential: &ServiceAccountCredential,
    audience: &str,
    issued_at: i64,
) -> DispatchResult<String> {
    let claims = AssertionClaims::new(&credential.client_email, audience, issued_at);
    let header = Header::new(Algorithm::RS256);

    Ok(encode(&header, &claims, &credential.signing_key)?)
}
