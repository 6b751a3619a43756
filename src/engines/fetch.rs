//! Plain HTTP fetch of the target for header compliance.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::time::Duration;

use crate::audit::headers::to_lowercase_map;
use crate::engines::{EngineError, HeaderFetcher};

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// GETs the target (following redirects) and returns the final response headers.
#[derive(Debug, Clone)]
pub struct ReqwestHeaderFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHeaderFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()
            .map_err(|e| EngineError::Fetch(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HeaderFetcher for ReqwestHeaderFetcher {
    async fn fetch(&self, url: &str) -> Result<HashMap<String, String>, EngineError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout {
                    stage: "Header fetch",
                    secs: self.timeout.as_secs(),
                }
            } else {
                EngineError::Fetch(e.to_string())
            }
        })?;

        tracing::debug!(
            target_url = %url,
            final_url = %response.url(),
            status = %response.status(),
            "Fetched target headers"
        );
        Ok(to_lowercase_map(response.headers()))
    }
}
