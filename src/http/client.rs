use crate::rate_limiter::RateLimiter;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;

/// HTTP client with built-in rate limiting, shareable across tasks
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: Mutex<RateLimiter>,
}

impl RateLimitedClient {
    pub fn new(user_agent: &str, timeout_secs: u64, rate_limit_ms: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        let rate_limiter = Mutex::new(RateLimiter::new(rate_limit_ms));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;
        self.send_post_request(url, body).await
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_post_request<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send POST request")
    }
}
