use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Single fixed integration against the Gemini `generateContent` REST API.
/// The caller never sees the envelope shape; replies come back as raw JSON
/// for [`normalize_reply`](super::normalize::normalize_reply) to flatten.
pub struct ProviderClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ProviderClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build provider http client")?;
        Ok(Self {
            http,
            api_key,
            model,
        })
    }

    /// One text-completion call. Any transport, status, or decode failure
    /// surfaces as an error; the adapter turns those into the fallback path.
    pub async fn complete(&self, instruction: &str) -> anyhow::Result<Value> {
        let url = format!("{}/models/{}:generateContent", DEFAULT_BASE_URL, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": instruction }] }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("provider request failed")?
            .error_for_status()
            .context("provider returned error status")?;

        let reply: Value = response.json().await.context("decode provider reply")?;
        debug!(model = %self.model, "provider reply received");
        Ok(reply)
    }
}
