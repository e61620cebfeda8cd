//! Rate-limited HTTP transport for the fulfillment API
//!
//! Wraps a shared reqwest client behind a governor quota so bursts of
//! wizard activity stay inside the provider's per-minute allowance, and
//! tracks the remaining-request budget the provider reports back.

use governor::{
    clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState, state::NotKeyed, Quota,
    RateLimiter,
};
use reqwest::{Client, RequestBuilder, Response};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::fulfillment::traits::FulfillmentError;

/// Rate-limited HTTP client
pub struct RateLimitedClient {
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>,
    /// Remaining requests, as last reported via X-RateLimit-Remaining
    remaining_requests: AtomicU32,
}

impl RateLimitedClient {
    /// Create a client capped at `rate_limit_per_minute` requests
    pub fn new(rate_limit_per_minute: u32) -> Self {
        // Quota requires at least one request per minute
        let rate = NonZeroU32::new(rate_limit_per_minute.max(1)).unwrap();
        let limiter = RateLimiter::direct(Quota::per_minute(rate));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("podbridge/1.0")
            .build()
            .expect("Failed to create HTTP client");

        RateLimitedClient {
            client,
            limiter,
            remaining_requests: AtomicU32::new(rate_limit_per_minute),
        }
    }

    /// Remaining requests in the current window, if the provider reported it
    pub fn remaining_requests(&self) -> Option<u32> {
        let remaining = self.remaining_requests.load(Ordering::Relaxed);
        (remaining > 0).then_some(remaining)
    }

    /// Build a GET request against `url`
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Build a POST request against `url`
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Wait for a rate-limit permit, then execute the request
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, FulfillmentError> {
        self.limiter.until_ready().await;

        debug!("Executing rate-limited fulfillment request");
        let response = builder.send().await?;

        if let Some(remaining) = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.remaining_requests.store(remaining, Ordering::Relaxed);
        }

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            warn!(retry_after_secs = retry_after, "Rate limited by fulfillment provider");
            return Err(FulfillmentError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Ok(response)
    }
}
