use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::entitlement::{ClaimAllResponse, ClaimConfirmation, PrepareClaimResponse};
use crate::error::ProviderError;

pub const PREPARE_PATH: &str = "/api/rewards/claim/prepare";
pub const CLAIM_ALL_PATH: &str = "/api/rewards/claim/all";
pub const CONFIRM_PATH: &str = "/api/rewards/claim/confirm";

/// Server side of the claim flow: hands out proofs and records payouts.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    /// Entitlement of the signed-in user for the latest published epoch.
    async fn prepare_latest(&self) -> Result<PrepareClaimResponse, ProviderError>;

    /// Every published epoch the user has not claimed yet.
    async fn outstanding(&self) -> Result<ClaimAllResponse, ProviderError>;

    /// Reports a confirmed claim transaction so the server can mark it paid.
    async fn confirm_claim(&self, confirmation: &ClaimConfirmation) -> Result<(), ProviderError>;
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    ok: bool,
    error: Option<String>,
}

/// [`EntitlementProvider`] over the site's JSON API.
pub struct HttpEntitlementProvider {
    base_url: String,
    session_cookie: Option<String>,
    http: reqwest::Client,
}

impl HttpEntitlementProvider {
    pub fn new(base_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie,
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        match &self.session_cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiStatus>(&body)
                .ok()
                .and_then(|s| s.error)
                .unwrap_or(body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EntitlementProvider for HttpEntitlementProvider {
    async fn prepare_latest(&self) -> Result<PrepareClaimResponse, ProviderError> {
        debug!(path = PREPARE_PATH, "requesting latest entitlement");
        let response = self
            .request(Method::POST, PREPARE_PATH)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn outstanding(&self) -> Result<ClaimAllResponse, ProviderError> {
        debug!(path = CLAIM_ALL_PATH, "requesting outstanding entitlements");
        let response = self.request(Method::GET, CLAIM_ALL_PATH).send().await?;
        Self::decode(response).await
    }

    async fn confirm_claim(&self, confirmation: &ClaimConfirmation) -> Result<(), ProviderError> {
        let response = self
            .request(Method::POST, CONFIRM_PATH)
            .json(confirmation)
            .send()
            .await?;
        let status: ApiStatus = Self::decode(response).await?;
        if status.ok {
            Ok(())
        } else {
            Err(ProviderError::Refused(
                status.error.unwrap_or_else(|| "claim not recorded".to_string()),
            ))
        }
    }
}
