use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

use crate::error::ApiError;

use super::WeatherProvider;

const TIMELINE_PATH: [&str; 4] = ["VisualCrossingWebServices", "rest", "services", "timeline"];

/// Client for the Visual Crossing timeline API.
#[derive(Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    base_url: Url,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid provider base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("Invalid provider base URL: {base_url} cannot carry a path");
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for the weather provider")?;

        Ok(Self { api_key, base_url, http })
    }

    /// `{base}/VisualCrossingWebServices/rest/services/timeline/{location}/{date}`,
    /// with `location` and `date` percent-encoded as single segments.
    pub fn timeline_url(&self, location: &str, date: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(TIMELINE_PATH)
                .push(location)
                .push(date);
        }
        url
    }
}

impl std::fmt::Debug for VisualCrossingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualCrossingProvider")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_timeline(&self, location: &str, date: &str) -> Result<Value, ApiError> {
        let res = self
            .http
            .get(self.timeline_url(location, date))
            .query(&[
                ("unitGroup", "metric"),
                ("include", "days"),
                ("key", self.api_key.as_str()),
                ("contentType", "json"),
            ])
            .send()
            .await
            .map_err(|e| {
                // the URL carries the provider key
                tracing::error!(error = %e.without_url(), "Weather provider request failed");
                ApiError::bad_gateway("failed to reach weather provider")
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::error!(error = %e.without_url(), "Failed to read weather provider body");
            ApiError::bad_gateway("failed to reach weather provider")
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Weather provider returned an error status");
            return Err(ApiError::upstream(status.as_u16(), body));
        }

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Weather provider responded");

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "Weather provider body is not JSON");
            ApiError::bad_gateway("weather provider returned invalid JSON")
        })
    }
}
