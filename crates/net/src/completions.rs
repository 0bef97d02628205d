//! OpenAI-compatible chat-completions and models endpoints

use crate::client::NetClient;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use sov_errors::{Error, NetworkError};
use sov_types::ChatMessage;

/// Sampling parameters sent with every completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for an inference server speaking the OpenAI HTTP API
#[derive(Clone)]
pub struct ChatApi {
    net: NetClient,
    base_url: String,
    api_key: String,
}

impl ChatApi {
    /// Create a client rooted at `base_url` (e.g. `http://127.0.0.1:8000/v1`)
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidUrl`] if `base_url` is not an http(s) URL.
    pub fn new(
        net: NetClient,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidUrl(base_url).into());
        }

        Ok(Self {
            net,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send the conversation and return the first choice's content
    ///
    /// # Errors
    ///
    /// Returns a network error if the request fails, the server answers with
    /// an error status, or the body is not a chat completion.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, Error> {
        let url = self.endpoint("chat/completions");
        let body = ChatCompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        tracing::debug!(
            model = %params.model,
            messages = messages.len(),
            "requesting chat completion"
        );
        let response = self.net.post_json(&url, Some(&self.api_key), &body).await?;
        let completion: ChatCompletionResponse = parse_json(&url, response).await?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| NetworkError::InvalidResponse {
                endpoint: url.clone(),
                message: "no choices in completion".to_string(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    /// List the model ids the server is serving
    ///
    /// # Errors
    ///
    /// Returns a network error if the server cannot be reached or answers
    /// with something other than a model list.
    pub async fn list_models(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoint("models");
        let response = self.net.get(&url, Some(&self.api_key)).await?;
        let list: ModelList = parse_json(&url, response).await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

async fn parse_json<T>(url: &str, response: Response) -> Result<T, Error>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        Error::from(NetworkError::InvalidResponse {
            endpoint: url.to_string(),
            message: e.to_string(),
        })
    })
}
