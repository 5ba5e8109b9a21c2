use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::ApiError;

/// Validated inbound request. Built per call and dropped after the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub requester_name: String,
    pub location: String,
    pub date: String,
    pub token: String,
}

/// Numeric reading with the provider's original number text.
///
/// Integers render as their digits (`2`, `-0` as `0`) and decimals in
/// shortest round-trip form with at least one fractional digit (`10.0`,
/// `0.5`), switching to `1e+16` / `1e-05` notation outside `1e-4 ..= 1e16`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Reading(Number);

impl Reading {
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.0.to_string();
        if !text.contains(['.', 'e', 'E']) {
            let digits = if text == "-0" { "0" } else { text.as_str() };
            return f.write_str(digits);
        }
        f.write_str(&decimal_text(self.value()))
    }
}

fn decimal_text(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() { "nan".into() } else if value > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0".into() } else { "0.0".into() };
    }

    // `{:e}` gives the shortest round-trip digits, e.g. "-1.2345e3"
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if value < 0.0 { "-" } else { "" };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if !(-4..16).contains(&exponent) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() { String::new() } else { format!(".{rest}") };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exponent.unsigned_abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat(exponent.unsigned_abs() as usize - 1);
        return format!("{sign}0.{zeros}{digits}");
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{sign}{digits}{}.0", "0".repeat(int_len - digits.len()))
    } else {
        let (int_part, fraction) = digits.split_at(int_len);
        format!("{sign}{int_part}.{fraction}")
    }
}

/// One day of provider data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "temp")]
    pub temperature: Reading,
    #[serde(rename = "feelslike")]
    pub feels_like: Reading,
    #[serde(rename = "windspeed")]
    pub wind_speed: Reading,
    pub pressure: Reading,
    pub humidity: Reading,
    pub visibility: Reading,
    #[serde(rename = "preciptype", default)]
    pub precipitation_type: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    days: Vec<Value>,
}

impl WeatherSnapshot {
    /// Extracts the first day of a timeline response.
    pub fn from_timeline(timeline: &Value) -> Result<Self, ApiError> {
        let timeline = Timeline::deserialize(timeline).map_err(|e| {
            tracing::warn!(error = %e, "Timeline response has no usable days array");
            unexpected_payload()
        })?;

        let day = timeline.days.into_iter().next().ok_or_else(|| {
            tracing::warn!("Timeline response contained no days");
            unexpected_payload()
        })?;

        Self::deserialize(day).map_err(|e| {
            tracing::warn!(error = %e, "Timeline day is missing readings");
            unexpected_payload()
        })
    }

    pub fn has_precipitation(&self, tag: &str) -> bool {
        self.precipitation_type
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

fn unexpected_payload() -> ApiError {
    ApiError::bad_gateway("weather provider returned an unexpected payload")
}

/// Readings rendered as strings for the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherFields {
    pub temp_c: String,
    pub feelslike_temp_c: String,
    pub wind_kph: String,
    pub pressure_mb: String,
    pub humidity: String,
    pub visibility_km: String,
}

impl From<&WeatherSnapshot> for WeatherFields {
    fn from(snapshot: &WeatherSnapshot) -> Self {
        Self {
            temp_c: snapshot.temperature.to_string(),
            feelslike_temp_c: snapshot.feels_like.to_string(),
            wind_kph: snapshot.wind_speed.to_string(),
            pressure_mb: snapshot.pressure.to_string(),
            humidity: snapshot.humidity.to_string(),
            visibility_km: snapshot.visibility.to_string(),
        }
    }
}

/// Success body of `POST /weather`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherReport {
    pub requester_name: String,
    pub timestamp: String,
    pub location: String,
    pub date: String,
    pub weather: WeatherFields,
    #[serde(rename = "x> recommendations <x")]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timeline(day: Value) -> Value {
        json!({ "days": [day] })
    }

    #[test]
    fn parses_first_day_only() {
        let body = json!({
            "days": [
                { "temp": 2, "feelslike": 0, "windspeed": 10, "pressure": 1012,
                  "humidity": 80, "visibility": 0.5, "preciptype": ["rain"] },
                { "temp": "broken" }
            ]
        });

        let snapshot = WeatherSnapshot::from_timeline(&body).unwrap();
        assert_eq!(snapshot.temperature.value(), 2.0);
        assert_eq!(snapshot.visibility.value(), 0.5);
        assert!(snapshot.has_precipitation("rain"));
        assert!(!snapshot.has_precipitation("snow"));
    }

    #[test]
    fn null_or_missing_preciptype_is_none() {
        let with_null = timeline(json!({
            "temp": 20, "feelslike": 20, "windspeed": 5, "pressure": 1015,
            "humidity": 50, "visibility": 10, "preciptype": null
        }));
        let without = timeline(json!({
            "temp": 20, "feelslike": 20, "windspeed": 5, "pressure": 1015,
            "humidity": 50, "visibility": 10
        }));

        for body in [with_null, without] {
            let snapshot = WeatherSnapshot::from_timeline(&body).unwrap();
            assert_eq!(snapshot.precipitation_type, None);
            assert!(!snapshot.has_precipitation("rain"));
        }
    }

    #[test]
    fn rejects_empty_or_malformed_timelines() {
        for body in [
            json!({}),
            json!({ "days": [] }),
            json!({ "days": "nope" }),
            timeline(json!({ "temp": 1 })),
            timeline(json!({
                "temp": "warm", "feelslike": 0, "windspeed": 0, "pressure": 0,
                "humidity": 0, "visibility": 0
            })),
        ] {
            let err = WeatherSnapshot::from_timeline(&body).unwrap_err();
            assert_eq!(err.status_code(), 502);
            assert_eq!(err.message(), "weather provider returned an unexpected payload");
        }
    }

    fn rendered(raw: &str) -> String {
        serde_json::from_str::<Reading>(raw).unwrap().to_string()
    }

    #[test]
    fn integers_render_as_digits() {
        assert_eq!(rendered("2"), "2");
        assert_eq!(rendered("-7"), "-7");
        assert_eq!(rendered("-0"), "0");
        assert_eq!(rendered("100000000000000000000"), "100000000000000000000");
    }

    #[test]
    fn decimals_render_in_shortest_form() {
        assert_eq!(rendered("10.0"), "10.0");
        assert_eq!(rendered("0.5"), "0.5");
        assert_eq!(rendered("-0.0"), "-0.0");
        assert_eq!(rendered("1012.30"), "1012.3");
        assert_eq!(rendered("1.0e3"), "1000.0");
        assert_eq!(rendered("123456.789"), "123456.789");
        assert_eq!(rendered("0.0001"), "0.0001");
        assert_eq!(rendered("0.00001"), "1e-05");
        assert_eq!(rendered("0.000015"), "1.5e-05");
        assert_eq!(rendered("1e16"), "1e+16");
        assert_eq!(rendered("1e15"), "1000000000000000.0");
        assert_eq!(rendered("1.5e100"), "1.5e+100");
    }

    #[test]
    fn large_integer_keeps_its_value_for_rules() {
        let reading = serde_json::from_str::<Reading>("100000000000000000000").unwrap();
        assert_eq!(reading.value(), 1e20);
    }

    #[test]
    fn report_uses_legacy_recommendation_key() {
        let report = WeatherReport {
            requester_name: "Olena".into(),
            timestamp: "2024-01-15T09:05:03Z".into(),
            location: "Kyiv".into(),
            date: "2024-01-15".into(),
            weather: WeatherFields {
                temp_c: "2".into(),
                feelslike_temp_c: "0".into(),
                wind_kph: "10".into(),
                pressure_mb: "1012".into(),
                humidity: "80".into(),
                visibility_km: "0.5".into(),
            },
            recommendations: vec!["It's all in your hands.".into()],
        };

        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["x> recommendations <x"], json!(["It's all in your hands."]));
        assert!(body.get("recommendations").is_none());
    }

    #[test]
    fn fields_keep_provider_number_formatting() {
        let body = timeline(json!({
            "temp": 2, "feelslike": -1.5, "windspeed": 10.0, "pressure": 1012.3,
            "humidity": 80, "visibility": 0.5, "preciptype": null
        }));
        let snapshot = WeatherSnapshot::from_timeline(&body).unwrap();

        let fields = WeatherFields::from(&snapshot);
        assert_eq!(fields.temp_c, "2");
        assert_eq!(fields.feelslike_temp_c, "-1.5");
        assert_eq!(fields.wind_kph, "10.0");
        assert_eq!(fields.pressure_mb, "1012.3");
        assert_eq!(fields.humidity, "80");
        assert_eq!(fields.visibility_km, "0.5");
    }
}
