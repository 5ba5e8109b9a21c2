//! Request handling for `POST /weather`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::{
    error::ApiError,
    model::{WeatherFields, WeatherReport, WeatherRequest, WeatherSnapshot},
    provider::WeatherProvider,
    recommend::recommendations,
};

/// Format of the `timestamp` field in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Validates weather requests and turns provider data into reports.
#[derive(Clone)]
pub struct WeatherService {
    api_token: String,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(api_token: String, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { api_token, provider }
    }

    pub async fn report(&self, payload: &Value) -> Result<WeatherReport, ApiError> {
        self.report_at(payload, Utc::now()).await
    }

    /// Same as [`WeatherService::report`] with the timestamp taken from `now`.
    pub async fn report_at(
        &self,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, ApiError> {
        let request = self.validate(payload)?;
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

        let timeline = self.provider.fetch_timeline(&request.location, &request.date).await?;
        let snapshot = WeatherSnapshot::from_timeline(&timeline)?;
        let recommendations = recommendations(&snapshot);

        tracing::info!(
            requester = %request.requester_name,
            location = %request.location,
            date = %request.date,
            advice = recommendations.len(),
            "Weather report built"
        );

        Ok(WeatherReport {
            requester_name: request.requester_name,
            timestamp,
            location: request.location,
            date: request.date,
            weather: WeatherFields::from(&snapshot),
            recommendations,
        })
    }

    /// Checks run in order and the first failure wins:
    /// token present, token matches, then requester_name, location, date.
    pub fn validate(&self, payload: &Value) -> Result<WeatherRequest, ApiError> {
        let payload = Payload::new(payload)?;

        let token = payload.require_token(&self.api_token)?;

        let requester_name = payload.require_str("requester_name", "name is required")?;
        let location = payload.require_str("location", "location is required")?;
        let date = payload.require_str("date", "date is required")?;

        Ok(WeatherRequest {
            requester_name: requester_name.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            token: token.to_string(),
        })
    }
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("api_token", &"<redacted>")
            .field("provider", &self.provider)
            .finish()
    }
}

/// Typed view over the inbound JSON object.
struct Payload<'a>(&'a Map<String, Value>);

impl<'a> Payload<'a> {
    fn new(value: &'a Value) -> Result<Self, ApiError> {
        value
            .as_object()
            .map(Self)
            .ok_or_else(|| ApiError::validation("request body must be a JSON object"))
    }

    /// `null` is treated the same as an absent field.
    fn optional_str(&self, field: &str) -> Result<Option<&'a str>, ApiError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => {
                let mut payload = Map::new();
                payload.insert("field".to_string(), json!(field));
                Err(ApiError::validation(format!("{field} must be a string")).with_payload(payload))
            }
        }
    }

    /// Any present value other than the expected string is a mismatch.
    fn require_token(&self, expected: &str) -> Result<&'a str, ApiError> {
        match self.0.get("token") {
            None | Some(Value::Null) => Err(ApiError::validation("token is required")),
            Some(Value::String(token)) if token == expected => Ok(token.as_str()),
            Some(_) => {
                tracing::warn!("Rejected request with wrong API token");
                Err(ApiError::auth("wrong API token"))
            }
        }
    }

    fn require_str(&self, field: &str, missing: &str) -> Result<&'a str, ApiError> {
        self.optional_str(field)?
            .ok_or_else(|| ApiError::validation(missing))
    }
}
