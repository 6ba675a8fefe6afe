//! OpenAI-compatible chat completions (AvalAI, OpenRouter, OpenAI itself).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{status_error, ChatMessage, CompletionRequest, LlmClient, ProviderError};

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(http: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

fn build_body<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
    ChatCompletionBody {
        model,
        messages: &request.messages,
        temperature: request.temperature,
        top_p: request.top_p,
        response_format: request
            .json_mode
            .then(|| json!({ "type": "json_object" })),
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
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

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let body = build_body(&self.model, &request);

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            json_mode = request.json_mode,
            "Calling OpenAI-compatible provider"
        );

        let resp = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_sets_json_response_format_only_when_asked() {
        let request = CompletionRequest::prompt("hi".to_string(), 0.5).json();
        let value = serde_json::to_value(build_body("gemini-2.5-flash", &request)).unwrap();
        assert_eq!(value["model"], "gemini-2.5-flash");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value.get("top_p").is_none());

        let plain = CompletionRequest::prompt("hi".to_string(), 0.5).top_p(0.9);
        let value = serde_json::to_value(build_body("m", &plain)).unwrap();
        assert!(value.get("response_format").is_none());
        assert!(value["top_p"].as_f64().is_some());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = OpenAiCompatibleClient::new(
            reqwest::Client::new(),
            "https://api.avalai.ir/v1/".to_string(),
            "m".to_string(),
        );
        assert_eq!(
            client.completions_url(),
            "https://api.avalai.ir/v1/chat/completions"
        );
    }
}
