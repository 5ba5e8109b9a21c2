use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{config::ServiceSettings, error::ApiError};

pub mod visualcrossing;

pub use visualcrossing::VisualCrossingProvider;

/// Source of day-level timeline data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the timeline for `location` on `date`.
    ///
    /// Returns the provider body unmodified; non-success statuses are mirrored
    /// as [`ApiError::upstream`].
    async fn fetch_timeline(&self, location: &str, date: &str) -> Result<Value, ApiError>;
}

/// Construct the provider described by the resolved settings.
pub fn provider_from_settings(settings: &ServiceSettings) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = VisualCrossingProvider::new(
        settings.provider_key.clone(),
        settings.base_url.clone(),
        settings.timeout,
    )?;
    Ok(Box::new(provider))
}
