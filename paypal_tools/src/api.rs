use std::sync::{Arc, RwLock};

use chrono::Utc;
use log::*;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    config::PayPalConfig,
    data_objects::{AccessToken, Money, PayPalOrder, PayPalRefund, TokenResponse},
    PayPalApiError,
};

/// A client for the handful of PayPal REST endpoints a prepaid checkout needs.
///
/// The OAuth access token is shared between clones and reused until shortly before it expires.
#[derive(Clone)]
pub struct PayPalApi {
    config: PayPalConfig,
    client: Arc<Client>,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl PayPalApi {
    pub fn new(config: PayPalConfig) -> Result<Self, PayPalApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PayPalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(RwLock::new(None)) })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    /// Exchanges the client credentials for a new access token and caches it.
    pub async fn refresh_token(&self) -> Result<AccessToken, PayPalApiError> {
        let url = self.url("/v1/oauth2/token");
        trace!("Requesting a new PayPal access token from {url}");
        let request = self
            .client
            .post(url)
            .basic_auth(&self.config.client_id, Some(self.config.secret.reveal()))
            .form(&[("grant_type", "client_credentials")]);
        let body = send(request, "access token").await?;
        let response =
            serde_json::from_str::<TokenResponse>(&body).map_err(|e| PayPalApiError::JsonError(e.to_string()))?;
        let token = AccessToken::from_response(response, Utc::now());
        debug!("New PayPal access token acquired. It expires at {}", token.expires_at);
        {
            let mut lock = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *lock = Some(token.clone());
        }
        Ok(token)
    }

    /// Returns the cached access token if it is still fresh, otherwise fetches a new one.
    pub async fn access_token(&self) -> Result<String, PayPalApiError> {
        let cached = {
            let lock = self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            lock.as_ref().filter(|t| t.is_fresh(Utc::now())).map(|t| t.token.clone())
        };
        match cached {
            Some(token) => Ok(token),
            None => self.refresh_token().await.map(|t| t.token),
        }
    }

    async fn authorized_request(&self, method: Method, path: &str) -> Result<RequestBuilder, PayPalApiError> {
        let token = self.access_token().await?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, PayPalApiError> {
        let mut request = self.authorized_request(method, path).await?;
        if let Some(body) = body {
            request = request.json(&body);
        }
        let body = send(request, path).await?;
        serde_json::from_str::<T>(&body).map_err(|e| PayPalApiError::JsonError(e.to_string()))
    }

    /// Fetches an order. The response body is kept verbatim in [`PayPalOrder::raw`].
    pub async fn get_order(&self, order_id: &str) -> Result<PayPalOrder, PayPalApiError> {
        let path = format!("/v2/checkout/orders/{order_id}");
        debug!("Fetching PayPal order {order_id}");
        let request = self.authorized_request(Method::GET, &path).await?;
        let body = send(request, &format!("order {order_id}")).await?;
        let order = PayPalOrder::from_body(body).map_err(|e| PayPalApiError::JsonError(e.to_string()))?;
        info!("Fetched PayPal order {order_id}. Status: {}", order.status);
        Ok(order)
    }

    /// Refunds `amount` from a captured payment.
    pub async fn refund_capture(&self, capture_id: &str, amount: Money) -> Result<PayPalRefund, PayPalApiError> {
        let path = format!("/v2/payments/captures/{capture_id}/refund");
        let body = json!({ "amount": amount });
        debug!("Refunding {} {} from capture {capture_id}", amount.value, amount.currency_code);
        let refund = self.rest_query::<PayPalRefund>(Method::POST, &path, Some(body)).await?;
        info!("Refund {} for capture {capture_id} is {}", refund.id, refund.status);
        Ok(refund)
    }
}

async fn send(request: RequestBuilder, what: &str) -> Result<String, PayPalApiError> {
    let response = request.send().await.map_err(|e| PayPalApiError::RestRequestError(e.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| PayPalApiError::RestResponseError(e.to_string()))?;
    match status {
        s if s.is_success() => {
            trace!("REST query successful. {s}");
            Ok(body)
        },
        StatusCode::UNAUTHORIZED => Err(PayPalApiError::Unauthorized(body)),
        StatusCode::NOT_FOUND => Err(PayPalApiError::NotFound(what.to_string())),
        s => Err(PayPalApiError::QueryError { status: s.as_u16(), message: body }),
    }
}
