//! Remote assistant service contract.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{AssistantContext, PetProfile};
use crate::prompts::SYSTEM_PROMPT;

/// Assistant errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Bad response (status {status}): {body}")]
    BadResponse { status: u16, body: String },

    #[error("Assistant returned an empty response")]
    EmptyResponse,
}

impl AssistantError {
    /// Text to show the owner. Locally computed insights stay available.
    pub fn user_message(&self) -> &'static str {
        match self {
            AssistantError::Network(_) | AssistantError::Timeout => {
                "Couldn't reach the assistant. Check your connection and try again."
            }
            AssistantError::BadResponse { .. } | AssistantError::EmptyResponse => {
                "The assistant couldn't answer right now. Please try again."
            }
        }
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// One completion request: the prompt plus optional structured context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantRequest {
    pub system: String,
    pub prompt: String,
    pub pet_profile: Option<PetProfile>,
    pub recent_events: Option<Vec<String>>,
    /// Base64-encoded images, e.g. a photo of a rash
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl AssistantRequest {
    /// A request with the shared system prompt and no context.
    pub fn new(prompt: String) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            pet_profile: None,
            recent_events: None,
            images: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: &AssistantContext) -> Self {
        self.pet_profile = Some(context.profile.clone());
        self.recent_events = Some(context.recent_events.clone());
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// A service that turns a prompt into free text.
pub trait AssistantService {
    fn complete(&self, request: &AssistantRequest) -> AssistantResult<String>;
}

/// Canned assistant for offline use and tests. Records every request.
pub struct MockAssistant {
    reply: AssistantResult<String>,
    requests: Mutex<Vec<AssistantRequest>>,
}

impl MockAssistant {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AssistantError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<AssistantRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AssistantService for MockAssistant {
    fn complete(&self, request: &AssistantRequest) -> AssistantResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone()
    }
}

#[cfg(feature = "remote")]
pub use remote::HttpAssistant;

#[cfg(feature = "remote")]
mod remote {
    use std::time::Duration;

    use serde::Deserialize;

    use super::{AssistantError, AssistantRequest, AssistantResult, AssistantService};

    /// Blocking JSON client for a hosted completion endpoint.
    ///
    /// POSTs the [`AssistantRequest`] as JSON and expects `{"text": "..."}`.
    pub struct HttpAssistant {
        endpoint: String,
        api_key: Option<String>,
        client: reqwest::blocking::Client,
    }

    #[derive(Deserialize)]
    struct CompletionResponse {
        text: String,
    }

    impl HttpAssistant {
        pub fn new(endpoint: &str, timeout_secs: u64) -> AssistantResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| AssistantError::Network(e.to_string()))?;
            Ok(Self {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                api_key: None,
                client,
            })
        }

        pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
            self.api_key = Some(api_key.into());
            self
        }
    }

    impl AssistantService for HttpAssistant {
        fn complete(&self, request: &AssistantRequest) -> AssistantResult<String> {
            let mut builder = self.client.post(&self.endpoint).json(request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout
                } else {
                    AssistantError::Network(e.to_string())
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "assistant request failed");
                return Err(AssistantError::BadResponse {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: CompletionResponse =
                response.json().map_err(|e| AssistantError::BadResponse {
                    status: status.as_u16(),
                    body: e.to_string(),
                })?;
            Ok(parsed.text)
        }
    }

}
