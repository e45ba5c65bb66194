use axum::http::{HeaderMap, HeaderName, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::WebhookError;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Primary header names followed by their unbranded aliases
const ID_HEADERS: [&str; 2] = ["svix-id", "webhook-id"];
const TIMESTAMP_HEADERS: [&str; 2] = ["svix-timestamp", "webhook-timestamp"];
const SIGNATURE_HEADERS: [&str; 2] = ["svix-signature", "webhook-signature"];

/// Verifies identity-provider webhooks signed with the Svix scheme:
/// `base64(HMAC-SHA256(key, "{id}.{timestamp}.{body}"))`.
pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// `secret` is the `whsec_`-prefixed signing secret from the provider dashboard
    pub fn new(secret: &str, tolerance_secs: i64) -> Result<Self, WebhookError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }

        Ok(Self {
            key,
            tolerance_secs,
        })
    }

    /// Check headers and raw body against the signing key
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, Utc::now().timestamp())
    }

    pub fn verify_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), WebhookError> {
        let msg_id = header_value(headers, &ID_HEADERS)?;
        let timestamp_raw = header_value(headers, &TIMESTAMP_HEADERS)?;
        let signatures = header_value(headers, &SIGNATURE_HEADERS)?;

        let timestamp: i64 = timestamp_raw
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac(msg_id, timestamp, body)?;

        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, encoded)| STANDARD.decode(encoded).ok())
            .any(|candidate| mac.clone().verify_slice(&candidate).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }

    /// Produce a `v1,<base64>` signature for the given message
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> Result<String, WebhookError> {
        let digest = self.mac(msg_id, timestamp, body)?.finalize().into_bytes();
        Ok(format!("{},{}", SIGNATURE_VERSION, STANDARD.encode(digest)))
    }

    /// Full header set a provider would send for this body
    pub fn signed_headers(
        &self,
        msg_id: &str,
        timestamp: i64,
        body: &[u8],
    ) -> Result<HeaderMap, WebhookError> {
        let signature = self.sign(msg_id, timestamp, body)?;
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (ID_HEADERS[0], msg_id.to_string()),
            (TIMESTAMP_HEADERS[0], timestamp.to_string()),
            (SIGNATURE_HEADERS[0], signature),
        ] {
            let value = HeaderValue::from_str(&value).map_err(|_| WebhookError::MissingHeader(name))?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(headers)
    }

    fn mac(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, names: &[&'static str; 2]) -> Result<&'a str, WebhookError> {
    names
        .iter()
        .find_map(|name| headers.get(*name))
        .ok_or(WebhookError::MissingHeader(names[0]))?
        .to_str()
        .map_err(|_| WebhookError::MissingHeader(names[0]))
}
