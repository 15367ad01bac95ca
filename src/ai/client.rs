use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
}

impl OpenRouterClient {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Result<Self, String> {
        let api_key = api_key.ok_or_else(|| "OPENROUTER_API_KEY is not set".to_string())?;
        let client = openrouter_api::OpenRouterClient::from_api_key_and_url(api_key, base_url)
            .map_err(|e| format!("Failed to create OpenRouter client: {}", e))?;

        Ok(Self { client })
    }

    /// Send one system + user exchange and return the assistant text.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        config: &ModelConfig,
    ) -> Result<String, GatewayError> {
        let messages = vec![Message::text("system", system), Message::text("user", prompt)];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()
            .map_err(|e| GatewayError::Provider(e.to_string()))?
            .chat_completion(request)
            .await
            .map_err(|e| GatewayError::Provider(format!("OpenRouter API error: {}", e)))?;

        let Some(choice) = response.choices.first() else {
            return Err(GatewayError::MalformedResponse(
                "No response choices received".to_string(),
            ));
        };
        match &choice.message.content {
            openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
            openrouter_api::MessageContent::Parts(parts) => {
                let text_parts: Vec<String> = parts
                    .iter()
                    .filter_map(|p| {
                        if let openrouter_api::ContentPart::Text(tc) = p {
                            Some(tc.text.clone())
                        } else {
                            None
                        }
                    })
                    .collect();
                Ok(text_parts.join("\n"))
            }
        }
    }
}

/// Plain chat-completions client for requests that carry an image part.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub async fn complete_with_image(
        &self,
        model: &str,
        prompt: &str,
        image_data_uri: &str,
    ) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Provider("OPENROUTER_API_KEY is not set".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = VisionRequest {
            model: model.to_string(),
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_uri.to_string(),
                        },
                    },
                ],
            }],
            temperature: DEFAULT_TEMPERATURE,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Provider(format!(
                "request failed with status {}",
                response.status()
            )));
        }

        let body: VisionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GatewayError::MalformedResponse("empty response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct VisionRequest {
    model: String,
    messages: Vec<VisionMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct VisionMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    choices: Vec<VisionChoice>,
}

#[derive(Debug, Deserialize)]
struct VisionChoice {
    message: VisionMessageResponse,
}

#[derive(Debug, Deserialize)]
struct VisionMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_client_uses_given_key_and_url() {
        let missing = OpenRouterClient::new(None, "https://openrouter.ai/api/v1/");
        assert!(missing.unwrap_err().contains("OPENROUTER_API_KEY"));

        let bad_url = OpenRouterClient::new(Some("sk-or-v1-0123456789abcdef"), "not a url");
        assert!(bad_url.is_err());

        let client = OpenRouterClient::new(
            Some("sk-or-v1-0123456789abcdef"),
            "http://localhost:8080/api/v1/",
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_vision_payload_shape() {
        let payload = VisionRequest {
            model: "m".to_string(),
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: "grade".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AA==".to_string(),
                        },
                    },
                ],
            }],
            temperature: 0.3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        let content = &json["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "grade");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/png;base64,AA=="
        );
    }

    #[tokio::test]
    async fn test_vision_without_api_key_fails_fast() {
        let client = VisionClient::new("http://127.0.0.1:9", None);
        let result = client
            .complete_with_image("m", "grade", "data:image/png;base64,AA==")
            .await;
        assert!(matches!(result, Err(GatewayError::Provider(_))));
    }

    #[test]
    fn test_vision_response_parsing() {
        let body: VisionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"score\": 80}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.choices[0].message.content.as_deref(),
            Some("{\"score\": 80}")
        );
    }
}
