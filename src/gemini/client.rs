use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

use crate::error::{FetchError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One text-generation call: a prompt plus the optional knobs the pipeline
/// uses (deterministic sampling, web-search grounding, a response schema).
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub web_search: bool,
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            web_search: false,
            response_schema: None,
        }
    }

    /// Temperature 0 for factual queries.
    pub fn deterministic(mut self) -> Self {
        self.temperature = Some(0.0);
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }

    /// Constrain the output shape when the provider supports it. Callers may
    /// then skip fence extraction on the reply.
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Model output text, tagged with whether the provider enforced a schema.
#[derive(Debug, Clone)]
pub struct GenerationReply {
    pub text: String,
    pub schema_constrained: bool,
}

/// Seam between the pipeline and the language-model provider. Stages depend
/// on this trait so tests can script replies without a network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

fn request_payload(request: &GenerationRequest) -> Value {
    let mut payload = json!({
        "contents": [
            {
                "parts": [
                    {"text": request.prompt}
                ]
            }
        ]
    });

    let mut config = serde_json::Map::new();
    if let Some(temperature) = request.temperature {
        config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(schema) = &request.response_schema {
        config.insert("responseMimeType".to_string(), json!("application/json"));
        config.insert("responseSchema".to_string(), schema.clone());
    }
    if !config.is_empty() {
        payload["generationConfig"] = Value::Object(config);
    }

    if request.web_search {
        payload["tools"] = json!([{"googleSearch": {}}]);
    }

    payload
}

fn extract_candidate_text(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("parts"))
        .and_then(Value::as_array)?;

    let mut chunks = Vec::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            chunks.push(text.to_string());
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply> {
        let url = format!(
            "{GENERATE_BASE_URL}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let payload = request_payload(request);

        log::debug!(
            "generateContent model={} web_search={} schema={}",
            self.model,
            request.web_search,
            request.response_schema.is_some()
        );

        let response = self.http.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "model call failed with status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let text = extract_candidate_text(&body).ok_or_else(|| {
            FetchError::Validation("model response missing text content".to_string())
        })?;

        Ok(GenerationReply {
            text,
            schema_constrained: request.response_schema.is_some(),
        })
    }
}
