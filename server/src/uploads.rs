//! Short-lived credentials that let a browser upload straight to the media CDN.
//!
//! The CDN checks `signature == hex(HMAC-SHA1(private_key, token + expire))`
//! and refuses anything past `expire`. The private key never leaves the
//! server; clients only ever see the public key and the signed params.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ring::hmac;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::MediaConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAuthParams {
    pub token: String,
    /// Unix timestamp (seconds) after which the CDN rejects the upload
    pub expire: i64,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UploadAuthError {
    #[error("upload params have expired")]
    Expired,
    #[error("upload signature does not match")]
    BadSignature,
}

#[derive(Clone)]
pub struct UploadSigner {
    key: Arc<hmac::Key>,
    ttl_secs: i64,
}

impl UploadSigner {
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            key: Arc::new(hmac::Key::new(
                hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
                media.private_key.as_bytes(),
            )),
            ttl_secs: media.token_ttl_secs,
        }
    }

    /// Issue fresh params valid for the configured lifetime
    pub fn issue(&self, now: DateTime<Utc>) -> UploadAuthParams {
        self.sign(Uuid::new_v4().to_string(), now.timestamp() + self.ttl_secs)
    }

    /// Sign a caller-chosen token and expiry
    pub fn sign(&self, token: String, expire: i64) -> UploadAuthParams {
        let tag = hmac::sign(&self.key, signing_payload(&token, expire).as_bytes());

        UploadAuthParams {
            token,
            expire,
            signature: hex::encode(tag.as_ref()),
        }
    }

    /// Check params the way the CDN does
    pub fn verify(
        &self,
        params: &UploadAuthParams,
        now: DateTime<Utc>,
    ) -> Result<(), UploadAuthError> {
        if params.expire < now.timestamp() {
            return Err(UploadAuthError::Expired);
        }

        let signature =
            hex::decode(&params.signature).map_err(|_| UploadAuthError::BadSignature)?;

        hmac::verify(
            &self.key,
            signing_payload(&params.token, params.expire).as_bytes(),
            &signature,
        )
        .map_err(|_| UploadAuthError::BadSignature)
    }
}

fn signing_payload(token: &str, expire: i64) -> String {
    format!("{token}{expire}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn signer() -> UploadSigner {
        UploadSigner::new(&crate::test_support::config().media)
    }

    #[test]
    fn signature_matches_cdn_scheme() {
        let params = signer().sign("fixed-token".to_string(), 1_700_001_800);

        assert_eq!(
            params.signature,
            "e511bb6e96e5e3f072575727765cf90762dde42b"
        );
    }

    #[test]
    fn issued_params_expire_after_ttl() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let params = signer().issue(now);

        assert_eq!(params.expire, 1_700_000_000 + MediaConfig::DEFAULT_TOKEN_TTL_SECS);
        assert!(Uuid::parse_str(&params.token).is_ok());
        assert_eq!(signer().verify(&params, now), Ok(()));
    }

    #[test]
    fn tokens_are_unique() {
        let now = Utc::now();
        let signer = signer();

        assert_ne!(signer.issue(now).token, signer.issue(now).token);
    }

    #[test]
    fn verify_rejects_tampering_and_expiry() {
        let signer = signer();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let params = signer.issue(now);

        let mut tampered = params.clone();
        tampered.expire += 60;
        assert_eq!(
            signer.verify(&tampered, now),
            Err(UploadAuthError::BadSignature)
        );

        let mut garbage = params.clone();
        garbage.signature = "zz".to_string();
        assert_eq!(
            signer.verify(&garbage, now),
            Err(UploadAuthError::BadSignature)
        );

        let later = now + chrono::Duration::seconds(MediaConfig::DEFAULT_TOKEN_TTL_SECS + 1);
        assert_eq!(signer.verify(&params, later), Err(UploadAuthError::Expired));
    }

    #[test]
    fn other_keys_do_not_verify() {
        let mut media = crate::test_support::config().media;
        media.private_key = "some_other_key".to_string();
        let other = UploadSigner::new(&media);

        let params = signer().sign("test-token".to_string(), 1_700_003_600);
        assert_eq!(
            params.signature,
            "37a735ca7b776bf41114fe7943d60cda815e8af1"
        );
        assert_eq!(
            other.verify(&params, Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
            Err(UploadAuthError::BadSignature)
        );
    }
}
