use serde_json::Value;

use crate::almanac::extract;
use crate::almanac::types::Coordinates;
use crate::error::{FetchError, Result};
use crate::gemini::client::{GenerationRequest, TextGenerator};

fn is_plain_decimal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let mut chars = digits.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_digit()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
}

/// Parse a strict numeric "lat, lng" literal. Anything else (place names,
/// partial numbers) returns `None` and goes to the model instead.
pub fn parse_coordinate_literal(location: &str) -> Option<Coordinates> {
    let (lat_raw, lng_raw) = location.split_once(',')?;
    let lat_raw = lat_raw.trim();
    let lng_raw = lng_raw.trim();
    if !is_plain_decimal(lat_raw) || !is_plain_decimal(lng_raw) {
        return None;
    }
    Some(Coordinates {
        latitude: lat_raw.parse().ok()?,
        longitude: lng_raw.parse().ok()?,
    })
}

fn build_geocode_prompt(location: &str) -> String {
    format!(
        "Your task is to act as a geocoding service. Convert the following location name into precise latitude and longitude coordinates.\n\
         Location: \"{location}\"\n\
         Your output must be ONLY a raw JSON object in the format: {{\"lat\": ..., \"lng\": ...}}.\n\
         Do not add any other text or explanation. If the location is invalid or cannot be found, return {{\"lat\": null, \"lng\": null}}."
    )
}

fn coordinates_from_value(value: &Value) -> Option<Coordinates> {
    let latitude = value.get("lat").and_then(Value::as_f64)?;
    let longitude = value.get("lng").and_then(Value::as_f64)?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

/// Resolve a free-form place description to coordinates.
///
/// Literal coordinate pairs short-circuit without a model call. Resolved
/// coordinates are never cached and the resolver never retries; a null or
/// malformed pair fails naming the location that could not be resolved.
pub async fn resolve_location(model: &dyn TextGenerator, location: &str) -> Result<Coordinates> {
    if let Some(coords) = parse_coordinate_literal(location) {
        return Ok(coords);
    }

    let request = GenerationRequest::new(build_geocode_prompt(location)).deterministic();
    let reply = model.generate(&request).await?;
    let value = extract::parse_reply(&reply)?;

    coordinates_from_value(&value).ok_or_else(|| FetchError::Resolution {
        location: location.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{build_geocode_prompt, parse_coordinate_literal};
    use crate::almanac::types::Coordinates;

    #[test]
    fn literal_pair_parses_without_a_network_call() {
        let got = parse_coordinate_literal("40.7128, -74.0060").expect("literal pair");
        assert_eq!(
            got,
            Coordinates {
                latitude: 40.7128,
                longitude: -74.006,
            }
        );
    }

    #[test]
    fn place_names_are_not_literals() {
        assert!(parse_coordinate_literal("Queens, NY").is_none());
        assert!(parse_coordinate_literal("the moon").is_none());
        assert!(parse_coordinate_literal("40.7128").is_none());
        assert!(parse_coordinate_literal("40.7.1, -74").is_none());
        assert!(parse_coordinate_literal(".5, .5").is_none());
    }

    #[test]
    fn negative_and_integer_halves_parse() {
        let got = parse_coordinate_literal("-33, 151").expect("integer pair");
        assert_eq!(got.latitude, -33.0);
        assert_eq!(got.longitude, 151.0);
    }

    #[test]
    fn geocode_prompt_quotes_the_location_and_demands_raw_json() {
        let prompt = build_geocode_prompt("Queens, NY");
        assert!(prompt.contains("\"Queens, NY\""));
        assert!(prompt.contains("{\"lat\": null, \"lng\": null}"));
    }
}
