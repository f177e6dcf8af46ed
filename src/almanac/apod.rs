use serde::Deserialize;
use serde_json::Value;

use crate::almanac::types::{MediaType, SkyPhotograph};
use crate::error::{FetchError, Result};

pub const APOD_URL: &str = "https://api.nasa.gov/planetary/apod";
/// Public unauthenticated-tier credential.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Wire shape of the image-of-the-day response, restricted to the fields the
/// pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ApodResponse {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ApodResponse {
    /// Map onto the domain record. The thumbnail is preferred over the
    /// full-resolution asset when present.
    pub fn into_photograph(self) -> Result<SkyPhotograph> {
        let media_type = match self.media_type.as_deref() {
            None => MediaType::default(),
            Some(raw) => MediaType::parse(raw)
                .ok_or_else(|| FetchError::Validation(format!("unsupported media type {raw:?}")))?,
        };
        let url = self
            .thumbnail_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(self.url);

        Ok(SkyPhotograph {
            title: self.title,
            url,
            media_type,
            explanation: self.explanation.unwrap_or_default(),
        })
    }
}

/// Fetch today's curated photograph from the fixed catalog endpoint.
pub async fn fetch_photo_of_the_day(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<SkyPhotograph> {
    let response = http
        .get(base_url)
        .query(&[("api_key", api_key)])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(FetchError::Network(format!(
            "image-of-the-day endpoint responded with status {}",
            response.status()
        )));
    }

    let text = response.text().await?;
    let value: Value = serde_json::from_str(&text).map_err(|_| FetchError::parse(&text))?;
    let body: ApodResponse = serde_json::from_value(value).map_err(|err| {
        FetchError::Validation(format!("image-of-the-day response has the wrong shape: {err}"))
    })?;
    body.into_photograph()
}

#[cfg(test)]
mod tests {
    use super::ApodResponse;
    use crate::almanac::types::MediaType;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> ApodResponse {
        serde_json::from_value(value).expect("wire shape")
    }

    #[test]
    fn fields_map_through_without_loss() {
        let got = response_from(json!({
            "title": "T",
            "url": "https://x/img.jpg",
            "media_type": "image",
            "explanation": "E"
        }))
        .into_photograph()
        .expect("photograph");

        assert_eq!(got.title, "T");
        assert_eq!(got.url, "https://x/img.jpg");
        assert_eq!(got.media_type, MediaType::Image);
        assert_eq!(got.explanation, "E");
    }

    #[test]
    fn thumbnail_is_preferred_over_the_full_asset() {
        let got = response_from(json!({
            "title": "Video of the day",
            "url": "https://x/full.mp4",
            "thumbnail_url": "https://x/thumb.jpg",
            "media_type": "video",
            "explanation": "E"
        }))
        .into_photograph()
        .expect("photograph");

        assert_eq!(got.url, "https://x/thumb.jpg");
        assert_eq!(got.media_type, MediaType::Video);
    }

    #[test]
    fn absent_media_type_defaults_to_image() {
        let got = response_from(json!({
            "title": "T",
            "url": "https://x/img.jpg"
        }))
        .into_photograph()
        .expect("photograph");

        assert_eq!(got.media_type, MediaType::Image);
        assert_eq!(got.explanation, "");
    }

    #[test]
    fn unknown_media_type_is_rejected() {
        let result = response_from(json!({
            "title": "T",
            "url": "https://x/a.bin",
            "media_type": "model"
        }))
        .into_photograph();
        assert!(result.is_err());
    }

    #[test]
    fn missing_title_fails_at_the_wire_layer() {
        let parsed: Result<ApodResponse, _> =
            serde_json::from_value(json!({"url": "https://x/img.jpg"}));
        assert!(parsed.is_err());
    }
}
