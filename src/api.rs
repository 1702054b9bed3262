use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::types::{Fill, OpenOrder};

/// Bound on every info request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only client for the venue's info endpoint.
///
/// Both queries are a single POST with a bounded timeout. Failures surface
/// as errors here; the poll loop decides how to degrade (see the cycle in
/// `bin/tracker.rs`) so that one wallet's outage never stalls the rest.
pub struct InfoClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct FillsResponse {
    #[serde(default)]
    fills: Vec<Fill>,
}

#[derive(Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<OpenOrder>,
}

impl InfoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch the fill history for a wallet.
    pub async fn fetch_fills(&self, wallet: &str) -> Result<Vec<Fill>> {
        let resp: FillsResponse = self
            .post(&json!({ "type": "getFills", "user": wallet }))
            .await
            .with_context(|| format!("getFills failed for {wallet}"))?;
        debug!("Fetched {} fills for {wallet}", resp.fills.len());
        Ok(resp.fills)
    }

    /// Fetch the currently open orders for a wallet.
    pub async fn fetch_open_orders(&self, wallet: &str) -> Result<Vec<OpenOrder>> {
        let resp: OrdersResponse = self
            .post(&json!({ "type": "getOpenOrders", "user": wallet }))
            .await
            .with_context(|| format!("getOpenOrders failed for {wallet}"))?;
        debug!("Fetched {} open orders for {wallet}", resp.orders.len());
        Ok(resp.orders)
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, body: &serde_json::Value) -> Result<T> {
        self.http
            .post(&self.base_url)
            .json(body)
            .send()
            .await
            .context("request failed")?
            .error_for_status()
            .context("non-success status")?
            .json()
            .await
            .context("malformed response body")
    }
}
