//! Lunar phase facts and a daily space photograph for a user-chosen location
//! and date, fetched from a generative-language API (plus an optional fixed
//! image-of-the-day catalog), parsed out of loosely structured model output,
//! and validated into typed records for a presentation layer to render.

pub mod almanac;
pub mod env_loader;
pub mod error;
pub mod gemini;

pub use almanac::config::{AlmanacConfig, CompositionStrategy, IlluminationPolicy, PhotoSource};
pub use almanac::supervisor::{AlmanacSnapshot, FetchKey, SlotState, Supervisor};
pub use almanac::types::{Coordinates, LunarObservation, MediaType, SkyPhotograph};
pub use error::{FetchError, Result};
pub use gemini::client::{GeminiClient, GenerationReply, GenerationRequest, TextGenerator};
