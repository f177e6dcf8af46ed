pub mod client;

pub use client::{GeminiClient, GenerationReply, GenerationRequest, TextGenerator};
