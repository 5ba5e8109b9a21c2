//! Rule-based advice derived from a day of weather.

use crate::model::WeatherSnapshot;

pub const COLD_ADVICE: &str = "- it's easier to breathe without a runny nose, wear a hat and coat";
pub const FOG_ADVICE: &str =
    "- dont take your glasses, you won't see much... dense fog is expected";
pub const RAIN_ADVICE: &str =
    "- take an umbrella, because your hair will be ruined) rain is expected";
pub const SNOW_ADVICE: &str = "- it looks like it will snow, make yourself some delicious cocoa";
pub const FALLBACK_ADVICE: &str = "It's all in your hands.";

/// Below this temperature (°C) the cold advice fires.
const COLD_BELOW_C: f64 = 5.0;
/// Below this visibility (km) the fog advice fires.
const FOG_BELOW_KM: f64 = 1.0;

/// Builds the recommendation list. Rule order is part of the output contract.
pub fn recommendations(snapshot: &WeatherSnapshot) -> Vec<String> {
    let rules: [(bool, &str); 4] = [
        (snapshot.temperature.value() < COLD_BELOW_C, COLD_ADVICE),
        (snapshot.visibility.value() < FOG_BELOW_KM, FOG_ADVICE),
        (snapshot.has_precipitation("rain"), RAIN_ADVICE),
        (snapshot.has_precipitation("snow"), SNOW_ADVICE),
    ];

    let advice: Vec<String> = rules
        .into_iter()
        .filter(|(fires, _)| *fires)
        .map(|(_, text)| text.to_string())
        .collect();

    if advice.is_empty() {
        vec![FALLBACK_ADVICE.to_string()]
    } else {
        advice
    }
}
