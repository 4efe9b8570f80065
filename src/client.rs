//! SmartGen Cloud Plus session client
//!
//! Owns the configuration, the HTTP client, the payload cipher, the
//! request signer, and the one piece of mutable state: the session token.
//! The token starts absent, is set (or cleared) by the result of each
//! `login` call, and rides along on every subsequent request.
//!
//! Not internally synchronized - one client per session, and `login`
//! takes `&mut self` so the token can only change under exclusive access.
//! There is no automatic re-login; callers can watch [`auth_mode`] and
//! decide their own policy.
//!
//! [`auth_mode`]: SmartGenClient::auth_mode

use crate::config::SmartGenConfig;
use crate::crypto::PayloadCipher;
use crate::envelope::RequestEnvelope;
use crate::error::{Result, SmartGenError};
use crate::response::{self, ResponseMap};
use crate::sign::RequestSigner;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const LOGIN_PATH: &str = "/user/login";
pub const STATUS_PATH: &str = "/devicedata/getstatus";
pub const MONITOR_LIST_PATH: &str = "/realTimeData/monitorList";

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Anonymous,
    Authenticated,
}

/// Client for SmartGen Cloud Plus operations.
pub struct SmartGenClient {
    http: HttpClient,
    config: SmartGenConfig,
    cipher: PayloadCipher,
    signer: RequestSigner,
    token: Option<String>,
}

impl SmartGenClient {
    /// Validate the config and build the HTTP client with a fixed
    /// per-call deadline. No network activity happens here.
    pub fn new(config: SmartGenConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            cipher: PayloadCipher::default(),
            signer: RequestSigner::default(),
            token: None,
        })
    }

    /// Same as [`new`](Self::new) but against an alternate key and secret,
    /// for test endpoints that run their own crypto material.
    pub fn with_crypto(
        config: SmartGenConfig,
        cipher: PayloadCipher,
        signer: RequestSigner,
    ) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.cipher = cipher;
        client.signer = signer;
        Ok(client)
    }

    pub fn config(&self) -> &SmartGenConfig {
        &self.config
    }

    pub fn auth_mode(&self) -> AuthMode {
        if self.token.is_some() {
            AuthMode::Authenticated
        } else {
            AuthMode::Anonymous
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Drop the current token, returning the session to anonymous mode.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Log in with the configured credentials.
    ///
    /// The session token is taken from the decoded response (top-level
    /// `token`, else `data.token`). When neither is present the session
    /// stays anonymous; the response is returned to the caller either
    /// way, since what a token-less login response means is the caller's
    /// call.
    pub async fn login(&mut self) -> Result<ResponseMap> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LoginRequest<'a> {
            user_name: &'a str,
            password: &'a str,
            company_id: &'a str,
            language: &'a str,
        }

        let payload = LoginRequest {
            user_name: &self.config.username,
            password: &self.config.password,
            company_id: &self.config.company_id,
            language: &self.config.language,
        };
        let result = self.post(LOGIN_PATH, &payload, None).await?;
        self.absorb_login_response(&result);
        Ok(result)
    }

    /// Query device status, optionally narrowed to one device.
    pub async fn get_status(&self, device_code: Option<&str>) -> Result<ResponseMap> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct StatusRequest<'a> {
            company_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            device_code: Option<&'a str>,
        }

        let payload = StatusRequest {
            company_id: &self.config.company_id,
            device_code,
        };
        self.post(STATUS_PATH, &payload, self.token.as_deref())
            .await
    }

    /// First page of the real-time monitor list.
    pub async fn get_monitor_list(&self) -> Result<ResponseMap> {
        self.monitor_list_page(DEFAULT_PAGE, DEFAULT_PAGE_SIZE).await
    }

    /// One page of the real-time monitor list.
    pub async fn monitor_list_page(&self, page: u32, page_size: u32) -> Result<ResponseMap> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct MonitorListRequest<'a> {
            company_id: &'a str,
            page: u32,
            page_size: u32,
        }

        let payload = MonitorListRequest {
            company_id: &self.config.company_id,
            page,
            page_size,
        };
        self.post(MONITOR_LIST_PATH, &payload, self.token.as_deref())
            .await
    }

    /// One encrypted, signed round trip: build the envelope, POST it,
    /// surface non-2xx as an error, decode the wrapper.
    async fn post<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<ResponseMap> {
        let envelope =
            RequestEnvelope::build(&self.config, &self.cipher, &self.signer, payload, token)?;
        let url = format!("{}{}", self.config.base_url, path);

        let http_response = self
            .http
            .post(&url)
            .headers(envelope.headers)
            .body(envelope.body)
            .send()
            .await?;

        if !http_response.status().is_success() {
            let status = http_response.status().as_u16();
            let message = http_response.text().await.unwrap_or_default();
            return Err(SmartGenError::Api { message, status });
        }

        let wrapper: ResponseMap = http_response.json().await?;
        Ok(response::decode(wrapper, &self.cipher))
    }

    fn absorb_login_response(&mut self, wrapper: &ResponseMap) {
        self.token = response::extract_token(wrapper);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn client() -> SmartGenClient {
        SmartGenClient::new(SmartGenConfig::new("demo", "secret", "42")).unwrap()
    }

    fn wrapper(value: Value) -> ResponseMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn starts_anonymous() {
        let client = client();
        assert_eq!(client.auth_mode(), AuthMode::Anonymous);
        assert_eq!(client.token(), None);
    }

    #[test]
    fn login_response_with_token_authenticates() {
        let mut client = client();
        client.absorb_login_response(&wrapper(json!({"token": "abc123", "code": 0})));
        assert_eq!(client.auth_mode(), AuthMode::Authenticated);
        assert_eq!(client.token(), Some("abc123"));

        // Subsequent envelopes carry the token.
        let envelope = RequestEnvelope::build(
            &client.config,
            &client.cipher,
            &client.signer,
            &json!({"companyId": "42"}),
            client.token.as_deref(),
        )
        .unwrap();
        assert_eq!(envelope.headers["X-Token"], "abc123");
    }

    #[test]
    fn nested_token_authenticates() {
        let mut client = client();
        client.absorb_login_response(&wrapper(json!({"data": {"token": "nested"}})));
        assert_eq!(client.token(), Some("nested"));
    }

    #[test]
    fn tokenless_login_response_clears_state() {
        let mut client = client();
        client.absorb_login_response(&wrapper(json!({"token": "stale"})));
        assert_eq!(client.auth_mode(), AuthMode::Authenticated);

        client.absorb_login_response(&wrapper(json!({"code": 401, "msg": "denied"})));
        assert_eq!(client.auth_mode(), AuthMode::Anonymous);
        assert_eq!(client.token(), None);
    }

    #[test]
    fn clear_token_returns_to_anonymous() {
        let mut client = client();
        client.absorb_login_response(&wrapper(json!({"token": "abc123"})));
        client.clear_token();
        assert_eq!(client.auth_mode(), AuthMode::Anonymous);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_network_use() {
        let result = SmartGenClient::new(SmartGenConfig::new("", "secret", "42"));
        assert!(matches!(result, Err(SmartGenError::Config(_))));
    }
}
