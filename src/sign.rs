//! X-Sign generation - nested MD5 over timestamp, optional token, secret
//!
//! The remote verifier recomputes this digest, so concatenation order is
//! fixed: token (when present), then the decimal timestamp, then either
//! the shared secret (inner round) or the inner digest (outer round).

use md5::{Digest, Md5};

/// Shared signing secret used by the production endpoint.
pub const DEFAULT_SECRET: &str = "fsh@TRuZ4dvcp5uY";

/// Generates the per-request `X-Sign` header value.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Two-round digest; pure function of `(ts, token)` for a fixed secret.
    pub fn sign(&self, ts: u64, token: Option<&str>) -> String {
        match token {
            Some(token) => {
                let inner = md5_hex(&format!("{}{}{}", token, ts, self.secret));
                md5_hex(&format!("{}{}{}", token, ts, inner))
            }
            None => {
                let inner = md5_hex(&format!("{}{}", ts, self.secret));
                md5_hex(&format!("{}{}", ts, inner))
            }
        }
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET)
    }
}

fn md5_hex(value: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_known_vector() {
        let signer = RequestSigner::default();
        assert_eq!(
            signer.sign(1_700_000_000, None),
            "b3c699b7e8af1839961642978bdd3765"
        );
    }

    #[test]
    fn token_known_vector() {
        let signer = RequestSigner::default();
        assert_eq!(
            signer.sign(1_700_000_000, Some("abc123")),
            "20378216d605e43ee0cb7a8d174c964d"
        );
    }

    #[test]
    fn deterministic() {
        let signer = RequestSigner::default();
        assert_eq!(
            signer.sign(1_700_000_000, Some("tok")),
            signer.sign(1_700_000_000, Some("tok"))
        );
    }

    #[test]
    fn inputs_change_output() {
        let signer = RequestSigner::default();
        let base = signer.sign(1_700_000_000, None);
        assert_ne!(base, signer.sign(1_700_000_001, None));
        assert_ne!(base, signer.sign(1_700_000_000, Some("abc123")));
        assert_ne!(
            signer.sign(1_700_000_000, Some("a")),
            signer.sign(1_700_000_000, Some("b"))
        );
    }

    #[test]
    fn output_is_lowercase_hex() {
        let digest = RequestSigner::default().sign(1_700_000_000, None);
        assert_eq!(digest.len(), 32);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn secret_is_parameterized() {
        let a = RequestSigner::new("secret-a").sign(1_700_000_000, None);
        let b = RequestSigner::new("secret-b").sign(1_700_000_000, None);
        assert_ne!(a, b);
    }
}
