use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::almanac::config::IlluminationPolicy;
use crate::almanac::extract::{self, missing_field, require_text};
use crate::almanac::types::{Coordinates, LunarObservation};
use crate::error::{FetchError, Result};
use crate::gemini::client::{GenerationRequest, TextGenerator};

/// Long-form date for prompt phrasing, e.g. "January 1, 2024".
pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn build_observation_prompt(coords: Coordinates, date: NaiveDate) -> String {
    format!(
        "Your task is to act as a precise astronomical data fetcher. Query timeanddate.com for the geographic coordinates (latitude: {}, longitude: {}) on the date {}.\n\
         From the timeanddate.com result, you MUST extract the following exact values:\n\
         1. Moonrise time (in HH:MM AM/PM format)\n\
         2. Moonset time (in HH:MM AM/PM format)\n\
         3. Moon phase name (e.g., \"Waxing Gibbous\")\n\
         4. Illumination percentage (as a number)\n\n\
         If a value does not exist for that day (for example, the moon does not set or rise), you must use the string \"N/A\".\n\n\
         Your final output must be ONLY the raw JSON object containing this data. Do not add any conversational text, explanations, or markdown formatting. The format MUST be:\n\
         {{\"moonrise\": \"...\", \"moonset\": \"...\", \"phase\": \"...\", \"illumination\": ...}}",
        coords.latitude,
        coords.longitude,
        long_date(date)
    )
}

/// Output shape for the schema-constrained request mode.
pub fn observation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "moonrise": {"type": "string"},
            "moonset": {"type": "string"},
            "phase": {"type": "string"},
            "illumination": {"type": "number"}
        },
        "required": ["moonrise", "moonset", "phase", "illumination"]
    })
}

fn observation_from_value(value: &Value, policy: IlluminationPolicy) -> Result<LunarObservation> {
    let moonrise = require_text(value, "moonrise")?;
    let moonset = require_text(value, "moonset")?;
    let phase = require_text(value, "phase")?;

    let raw = value
        .get("illumination")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing_field("illumination"))?;
    let illumination = match policy {
        IlluminationPolicy::PassThrough => raw,
        IlluminationPolicy::Clamp => raw.clamp(0.0, 100.0),
        IlluminationPolicy::Reject => {
            if !(0.0..=100.0).contains(&raw) {
                return Err(FetchError::Validation(format!(
                    "illumination {raw} is outside 0-100"
                )));
            }
            raw
        }
    };

    Ok(LunarObservation {
        moonrise,
        moonset,
        phase,
        illumination,
    })
}

/// Fetch the four lunar facts for one coordinates/date pair.
///
/// One request, no retry. A malformed reply or a reply missing any required
/// field is terminal; no partially populated record is ever returned.
pub async fn fetch_observation(
    model: &dyn TextGenerator,
    coords: Coordinates,
    date: NaiveDate,
    web_search: bool,
    response_schema: bool,
    policy: IlluminationPolicy,
) -> Result<LunarObservation> {
    let mut request = GenerationRequest::new(build_observation_prompt(coords, date)).deterministic();
    if web_search {
        request = request.with_web_search();
    }
    if response_schema {
        request = request.with_response_schema(observation_schema());
    }

    let reply = model.generate(&request).await?;
    let value = extract::parse_reply(&reply)?;
    observation_from_value(&value, policy)
}
