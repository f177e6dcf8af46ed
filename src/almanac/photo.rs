use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::almanac::extract::{self, require_text};
use crate::almanac::lunar::long_date;
use crate::almanac::types::{MediaType, SkyPhotograph};
use crate::error::{FetchError, Result};
use crate::gemini::client::{GenerationRequest, TextGenerator};

pub fn build_photograph_prompt(date: NaiveDate) -> String {
    format!(
        "Find a beautiful, high-quality, public domain space photograph with a title and brief explanation, relevant for the date {}. \
         Respond ONLY with a single, raw JSON object in the format: {{\"title\": \"...\", \"url\": \"...\", \"explanation\": \"...\"}}. \
         The URL must be a direct link to an image file (e.g., .jpg, .png) and MUST start with \"https://\".",
        long_date(date)
    )
}

/// Output shape for the schema-constrained request mode. The media type is
/// optional on the wire; absent means image.
pub fn photograph_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "url": {"type": "string"},
            "explanation": {"type": "string"},
            "media_type": {"type": "string"}
        },
        "required": ["title", "url", "explanation"]
    })
}

fn media_type_from_value(value: &Value) -> Result<MediaType> {
    let raw = value
        .get("media_type")
        .or_else(|| value.get("mediaType"))
        .filter(|v| !v.is_null());
    match raw {
        None => Ok(MediaType::default()),
        Some(Value::String(s)) => MediaType::parse(s)
            .ok_or_else(|| FetchError::Validation(format!("unsupported media type {s:?}"))),
        Some(other) => Err(FetchError::Validation(format!(
            "media type must be a string, got {other}"
        ))),
    }
}

fn photograph_from_value(value: &Value) -> Result<SkyPhotograph> {
    let title = require_text(value, "title")?;
    let url = require_text(value, "url")?;
    let media_type = media_type_from_value(value)?;
    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(SkyPhotograph {
        title,
        url,
        media_type,
        explanation,
    })
}

/// Ask the model for a representative space photograph for the date.
pub async fn fetch_photograph(
    model: &dyn TextGenerator,
    date: NaiveDate,
    response_schema: bool,
) -> Result<SkyPhotograph> {
    let mut request = GenerationRequest::new(build_photograph_prompt(date));
    if response_schema {
        request = request.with_response_schema(photograph_schema());
    }

    let reply = model.generate(&request).await?;
    let value = extract::parse_reply(&reply)?;
    photograph_from_value(&value)
}
