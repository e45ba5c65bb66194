use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SessionConfig;

/// Claims carried by an identity-provider session token. Only `sub` identifies
/// the caller; the rest are checked or passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Authorized party (the origin the session was issued for)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl SessionClaims {
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.into(),
            exp,
            iat: Some(now.timestamp()),
            nbf: None,
            iss: None,
            azp: None,
            sid: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("session token has no subject")]
    MissingSubject,

    #[error("unauthorized party: {0}")]
    UnauthorizedParty(String),

    #[error("session verification is not configured; set SESSION_JWT_PUBLIC_KEY or SESSION_JWT_SECRET")]
    NotConfigured,

    #[error("invalid session key: {0}")]
    InvalidKey(String),
}

/// Verifies session tokens issued by the identity provider
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    authorized_parties: Vec<String>,
}

impl SessionVerifier {
    pub fn from_config(config: &SessionConfig) -> Result<Self, AuthError> {
        let (decoding_key, algorithm) = match (&config.jwt_public_key, &config.jwt_secret) {
            (Some(pem), _) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::InvalidKey(e.to_string()))?,
                Algorithm::RS256,
            ),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => return Err(AuthError::NotConfigured),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 5;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            decoding_key,
            validation,
            authorized_parties: config.authorized_parties.clone(),
        })
    }

    /// Decode and validate a token, returning its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        if !self.authorized_parties.is_empty() {
            match &claims.azp {
                Some(azp) if self.authorized_parties.iter().any(|p| p == azp) => {}
                other => {
                    return Err(AuthError::UnauthorizedParty(
                        other.clone().unwrap_or_default(),
                    ))
                }
            }
        }

        Ok(claims)
    }
}

/// Sign an HS256 session token. Only meaningful when the server verifies with
/// `SESSION_JWT_SECRET`; used by the CLI and tests.
pub fn issue_token(secret: &str, claims: &SessionClaims) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidKey("empty secret".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &encoding_key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn hs_config() -> SessionConfig {
        SessionConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn round_trips_subject() {
        let verifier = SessionVerifier::from_config(&hs_config()).unwrap();
        let token = issue_token(SECRET, &SessionClaims::new("user_abc", 1)).unwrap();
        assert_eq!(verifier.verify(&token).unwrap().sub, "user_abc");
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = SessionVerifier::from_config(&hs_config()).unwrap();
        let token = issue_token("other-secret", &SessionClaims::new("user_abc", 1)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = SessionVerifier::from_config(&hs_config()).unwrap();
        let mut claims = SessionClaims::new("user_abc", 1);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn rejects_blank_subject() {
        let verifier = SessionVerifier::from_config(&hs_config()).unwrap();
        let token = issue_token(SECRET, &SessionClaims::new("  ", 1)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::MissingSubject)));
    }

    #[test]
    fn enforces_issuer_and_authorized_party() {
        let config = SessionConfig {
            issuer: Some("https://clerk.example.com".to_string()),
            authorized_parties: vec!["https://app.example.com".to_string()],
            ..hs_config()
        };
        let verifier = SessionVerifier::from_config(&config).unwrap();

        let mut claims = SessionClaims::new("user_abc", 1);
        claims.iss = Some("https://clerk.example.com".to_string());
        claims.azp = Some("https://evil.example.com".to_string());
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::UnauthorizedParty(_))));

        claims.azp = Some("https://app.example.com".to_string());
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(verifier.verify(&token).is_ok());

        claims.iss = Some("https://someone-else.example.com".to_string());
        let token = issue_token(SECRET, &claims).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn requires_some_key() {
        assert!(matches!(
            SessionVerifier::from_config(&SessionConfig::default()),
            Err(AuthError::NotConfigured)
        ));
    }
}
