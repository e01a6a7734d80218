//! Pre-authentication keys and signatures.
//!
//! A domain holds a shared `preAuthKey`. A trusted front end signs the request
//! parameters with HMAC-SHA256 under that key; the directory recomputes the
//! signature and checks the timestamp window.

use crate::error::{ProvisioningError, ProvisioningResult};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

const KEY_LEN: usize = 32;

/// Generate a new pre-auth key: 32 random bytes, hex encoded.
pub fn generate_pre_auth_key() -> String {
    let mut key = [0u8; KEY_LEN];
    rand::rngs::OsRng.fill_bytes(&mut key);
    hex::encode(key)
}

/// Sign parameters: values ordered by key, joined by `|`, HMAC-SHA256 in hex.
pub fn compute_pre_auth(params: &BTreeMap<String, String>, key: &str) -> ProvisioningResult<String> {
    Ok(hex::encode(pre_auth_mac(params, key)?.finalize().into_bytes()))
}

fn pre_auth_mac(params: &BTreeMap<String, String>, key: &str) -> ProvisioningResult<HmacSha256> {
    let joined = params.values().cloned().collect::<Vec<_>>().join("|");
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| ProvisioningError::internal(format!("invalid pre-auth key: {}", e)))?;
    mac.update(joined.as_bytes());
    Ok(mac)
}

/// Parameters of an account pre-auth request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreAuthRequest {
    pub account: String,
    /// Selector the account was given by (`name` or `id`)
    pub by: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    /// Validity in milliseconds after `timestamp`; 0 never expires
    pub expires: i64,
}

impl PreAuthRequest {
    pub fn params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("account".to_string(), self.account.clone()),
            ("by".to_string(), self.by.clone()),
            ("expires".to_string(), self.expires.to_string()),
            ("timestamp".to_string(), self.timestamp.to_string()),
        ])
    }

    pub fn sign(&self, key: &str) -> ProvisioningResult<String> {
        compute_pre_auth(&self.params(), key)
    }

    /// Check a signature and the time window as of `now_ms`.
    pub fn verify(
        &self,
        key: &str,
        preauth: &str,
        now_ms: i64,
        max_skew_ms: i64,
    ) -> ProvisioningResult<()> {
        // verify_slice compares in constant time
        let mismatch = || ProvisioningError::auth_failed(&self.account, "preauth mismatch");
        let signature = hex::decode(preauth).map_err(|_| mismatch())?;
        pre_auth_mac(&self.params(), key)?
            .verify_slice(&signature)
            .map_err(|_| mismatch())?;
        if now_ms.abs_diff(self.timestamp) > max_skew_ms.unsigned_abs() {
            return Err(ProvisioningError::auth_failed(
                &self.account,
                "preauth timestamp is too old or in the future",
            ));
        }
        if self.expires != 0 && now_ms > self.timestamp.saturating_add(self.expires) {
            return Err(ProvisioningError::auth_failed(&self.account, "preauth expired"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(timestamp: i64, expires: i64) -> PreAuthRequest {
        PreAuthRequest {
            account: "acct-1@d.test".to_string(),
            by: "name".to_string(),
            timestamp,
            expires,
        }
    }

    #[test]
    fn test_key_shape() {
        let key = generate_pre_auth_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_pre_auth_key());
    }

    #[test]
    fn test_signature_is_order_independent_of_insertion() {
        let key = "secret";
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(compute_pre_auth(&a, key).unwrap(), compute_pre_auth(&b, key).unwrap());
        assert_ne!(
            compute_pre_auth(&a, key).unwrap(),
            compute_pre_auth(&a, "other").unwrap()
        );
    }

    #[test]
    fn test_verify_window() {
        let key = generate_pre_auth_key();
        let now = 1_700_000_000_000;
        let skew = 5 * 60 * 1000;

        let fresh = request(now, 0);
        let signature = fresh.sign(&key).unwrap();
        assert!(fresh.verify(&key, &signature, now + 1000, skew).is_ok());
        assert!(fresh.verify(&key, "deadbeef", now, skew).is_err());
        assert!(fresh.verify(&key, &signature, now + skew + 1, skew).is_err());

        let short = request(now, 1000);
        let signature = short.sign(&key).unwrap();
        assert!(short.verify(&key, &signature, now + 500, skew).is_ok());
        assert!(short.verify(&key, &signature, now + 2000, skew).is_err());
    }

    #[test]
    fn test_extreme_timestamps_are_rejected() {
        let key = generate_pre_auth_key();
        let now = 1_700_000_000_000;
        let skew = 5 * 60 * 1000;

        for timestamp in [i64::MIN, i64::MAX] {
            let extreme = request(timestamp, i64::MAX);
            let signature = extreme.sign(&key).unwrap();
            let err = extreme.verify(&key, &signature, now, skew).unwrap_err();
            assert!(matches!(err, ProvisioningError::AuthFailed { .. }));
        }

        let fresh = request(now, 0);
        let signature = fresh.sign(&key).unwrap();
        assert!(fresh.verify(&key, &signature, i64::MIN, skew).is_err());
        assert!(fresh.verify(&key, &signature.to_uppercase(), now, skew).is_ok());
        assert!(fresh.verify(&key, "not hex", now, skew).is_err());
    }
}
