use serde::{Deserialize, Serialize};

/// Geocoding intermediate. Consumed by the fact retriever and discarded;
/// never cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of lunar facts for one place. Built fresh per request; a new
/// location or date produces a new record rather than an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarObservation {
    /// Clock string, or "N/A" when the moon does not rise that day.
    pub moonrise: String,
    /// Clock string, or "N/A" when the moon does not set that day.
    pub moonset: String,
    pub phase: String,
    /// Percent illuminated. Nominally 0-100; range handling is a
    /// configurable policy, not enforced here.
    pub illumination: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// Daily-curated space photograph metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyPhotograph {
    pub title: String,
    pub url: String,
    pub media_type: MediaType,
    pub explanation: String,
}
