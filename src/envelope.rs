//! Outbound request assembly - signed headers plus an encrypted body
//!
//! One wall-clock timestamp is captured per request and feeds both the
//! `X-Time` header and the signature; the two must agree or the remote
//! rejects the call. The body is the bare base64 ciphertext sent as
//! `text/plain` - the outer framing is plain text even though the inner
//! payload is encrypted JSON.

use crate::config::SmartGenConfig;
use crate::crypto::PayloadCipher;
use crate::error::{Result, SmartGenError};
use crate::sign::RequestSigner;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER, USER_AGENT,
};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub const USER_AGENT_VALUE: &str = "okhttp/4.9.0";
pub const UPDATE_DATE: &str = "20250321";
pub const ANONYMOUS_REFERER: &str = "https://www.smartgencloudplus.cn/login";
pub const AUTHENTICATED_REFERER: &str = "https://www.smartgencloudplus.cn/index";

/// A fully formed outbound request: timestamp, header set, encrypted body.
pub struct RequestEnvelope {
    pub timestamp: u64,
    pub headers: HeaderMap,
    pub body: String,
}

impl RequestEnvelope {
    /// Serialize, encrypt, and sign a payload for transmission.
    ///
    /// Payload structs keep their field order through serde, which is what
    /// the remote expects on the wire.
    pub fn build<T: Serialize>(
        config: &SmartGenConfig,
        cipher: &PayloadCipher,
        signer: &RequestSigner,
        payload: &T,
        token: Option<&str>,
    ) -> Result<Self> {
        let timestamp = unix_now();
        let json = serde_json::to_string(payload)?;
        let body = cipher.encrypt(&json);
        let headers = build_headers(config, signer, timestamp, token)?;
        Ok(Self {
            timestamp,
            headers,
            body,
        })
    }
}

fn build_headers(
    config: &SmartGenConfig,
    signer: &RequestSigner,
    ts: u64,
    token: Option<&str>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.language)?);
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert("X-Time", header_value(&ts.to_string())?);
    headers.insert("X-Timezone", header_value(&config.timezone)?);
    headers.insert("X-UpdateDate", HeaderValue::from_static(UPDATE_DATE));
    headers.insert("X-Companyid", header_value(&config.company_id)?);
    headers.insert("X-Sign", header_value(&signer.sign(ts, token))?);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain;charset=UTF-8"),
    );
    match token {
        Some(token) => {
            headers.insert("X-Token", header_value(token)?);
            headers.insert(REFERER, HeaderValue::from_static(AUTHENTICATED_REFERER));
        }
        None => {
            headers.insert(REFERER, HeaderValue::from_static(ANONYMOUS_REFERER));
        }
    }
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| SmartGenError::InvalidHeader(value.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Probe<'a> {
        user_name: &'a str,
        company_id: &'a str,
    }

    fn config() -> SmartGenConfig {
        SmartGenConfig::new("demo", "secret", "42")
    }

    fn build(token: Option<&str>) -> RequestEnvelope {
        RequestEnvelope::build(
            &config(),
            &PayloadCipher::default(),
            &RequestSigner::default(),
            &Probe {
                user_name: "demo",
                company_id: "42",
            },
            token,
        )
        .unwrap()
    }

    #[test]
    fn anonymous_header_contract() {
        let envelope = build(None);
        let h = &envelope.headers;
        assert_eq!(h[ACCEPT], "application/json, text/plain, */*");
        assert_eq!(h[ACCEPT_LANGUAGE], "en-US");
        assert_eq!(h[USER_AGENT], USER_AGENT_VALUE);
        assert_eq!(h["X-Timezone"], "UTC");
        assert_eq!(h["X-UpdateDate"], UPDATE_DATE);
        assert_eq!(h["X-Companyid"], "42");
        assert_eq!(h[CONTENT_TYPE], "text/plain;charset=UTF-8");
        assert_eq!(h[REFERER], ANONYMOUS_REFERER);
        assert!(!h.contains_key("X-Token"));
    }

    #[test]
    fn authenticated_header_contract() {
        let envelope = build(Some("abc123"));
        let h = &envelope.headers;
        assert_eq!(h["X-Token"], "abc123");
        assert_eq!(h[REFERER], AUTHENTICATED_REFERER);
    }

    #[test]
    fn time_and_sign_agree() {
        let envelope = build(Some("abc123"));
        let ts: u64 = envelope.headers["X-Time"].to_str().unwrap().parse().unwrap();
        assert_eq!(ts, envelope.timestamp);
        let expected = RequestSigner::default().sign(ts, Some("abc123"));
        assert_eq!(envelope.headers["X-Sign"], expected.as_str());
    }

    #[test]
    fn body_decrypts_to_ordered_payload_json() {
        let envelope = build(None);
        let clear = PayloadCipher::default().decrypt(&envelope.body).unwrap();
        assert_eq!(clear, r#"{"userName":"demo","companyId":"42"}"#);
    }

    #[test]
    fn bad_config_value_is_rejected() {
        let mut config = config();
        config.timezone = "UTC\nX-Evil: 1".into();
        let result = RequestEnvelope::build(
            &config,
            &PayloadCipher::default(),
            &RequestSigner::default(),
            &Probe {
                user_name: "demo",
                company_id: "42",
            },
            None,
        );
        assert!(matches!(result, Err(SmartGenError::InvalidHeader(_))));
    }
}
