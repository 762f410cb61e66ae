//! HTTP client for text generation providers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::LanguageModel;
use crate::config::LlmConfig;
use crate::config::ProviderKind;
use crate::errors::check_status;
use crate::errors::ProfileChatError;
use crate::errors::Result;
use crate::errors::UpstreamService;

const SERVICE: UpstreamService = UpstreamService::LanguageModel;

/// Generation client for the configured provider
#[derive(Clone)]
pub struct LlmService {
    provider: ProviderKind,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: usize,
    client: Client,
}

impl LlmService {
    /// Create a new generation client
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProfileChatError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: config.provider,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn require_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ProfileChatError::upstream(SERVICE, format!("{} API key not configured", self.provider))
        })
    }

    async fn generate_gemini(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GeminiRequest<'a> {
            contents: [GeminiContent<'a>; 1],
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct GeminiContent<'a> {
            parts: [GeminiPart<'a>; 1],
        }

        #[derive(Serialize)]
        struct GeminiPart<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            max_output_tokens: usize,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<CandidatePart>,
        }

        #[derive(Deserialize)]
        struct CandidatePart {
            #[serde(default)]
            text: String,
        }

        let api_key = self.require_key()?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!("Calling Gemini generateContent: {}", url);

        let request = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "Gemini").await?;

        let result: GeminiResponse = response
            .json()
            .await
            .map_err(|e| malformed(format!("Failed to parse Gemini response: {e}")))?;

        let text: String = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        non_empty(text, "Gemini")
    }

    async fn generate_openai(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: [ChatMessage<'a>; 1],
            temperature: f32,
            max_tokens: usize,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let api_key = self.require_key()?;
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "OpenAI").await?;

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| malformed(format!("Failed to parse OpenAI response: {e}")))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(text, "OpenAI")
    }

    async fn generate_ollama(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            #[serde(default)]
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "Ollama").await?;

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| malformed(format!("Failed to parse Ollama response: {e}")))?;
        non_empty(result.response, "Ollama")
    }
}

#[async_trait]
impl LanguageModel for LlmService {
    fn name(&self) -> &str {
        match self.provider {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.provider {
            ProviderKind::Gemini => self.generate_gemini(prompt).await,
            ProviderKind::OpenAI => self.generate_openai(prompt).await,
            ProviderKind::Ollama => self.generate_ollama(prompt).await,
        }
    }
}

fn malformed(message: String) -> ProfileChatError {
    ProfileChatError::MalformedUpstreamResponse(message)
}

fn non_empty(text: String, provider: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(malformed(format!("{provider} returned no text")))
    } else {
        Ok(text)
    }
}
