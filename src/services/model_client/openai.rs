//! OpenAI Responses API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationOptions, ModelClient, ProviderError};
use crate::config::OpenAiConfig;
use crate::message::{ChatMessage, Role};
use crate::schema::Schema;

const RESPONSES_PATH: &str = "/responses";
const SCHEMA_NAME: &str = "response";

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    temperature: f32,
    text: TextConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Tool>,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: InputContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum InputContent<'a> {
    Text(&'a str),
    Parts(Vec<InputPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputPart<'a> {
    InputText { text: &'a str },
    InputImage { image_url: &'a str },
}

#[derive(Serialize)]
struct TextConfig {
    format: TextFormat,
}

#[derive(Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    schema: Value,
    strict: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Tool {
    WebSearchPreview {
        #[serde(skip_serializing_if = "Option::is_none")]
        search_context_size: Option<&'static str>,
    },
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            url: format!("{}{}", config.base_url.trim_end_matches('/'), RESPONSES_PATH),
        })
    }

    fn build_input<'a>(
        conversation: &'a [ChatMessage],
        image_urls: &'a [String],
    ) -> Vec<InputMessage<'a>> {
        let last_user = conversation.iter().rposition(|m| m.role == Role::User);
        conversation
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let content = if Some(i) == last_user && !image_urls.is_empty() {
                    let mut parts = vec![InputPart::InputText { text: &message.content }];
                    parts.extend(
                        image_urls
                            .iter()
                            .map(|url| InputPart::InputImage { image_url: url }),
                    );
                    InputContent::Parts(parts)
                } else {
                    InputContent::Text(&message.content)
                };
                InputMessage {
                    role: message.role.as_str(),
                    content,
                }
            })
            .collect()
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn generate_structured(
        &self,
        conversation: &[ChatMessage],
        target: &Schema,
        options: &GenerationOptions,
    ) -> Result<Value, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::NotConfigured("OPENAI_API_KEY is not set".to_string()));
        };

        let (tools, tool_choice) = if options.web_search {
            (
                vec![Tool::WebSearchPreview { search_context_size: Some("high") }],
                Some(Tool::WebSearchPreview { search_context_size: None }),
            )
        } else {
            (Vec::new(), None)
        };

        let request = ResponsesRequest {
            model: &options.model,
            input: Self::build_input(conversation, &options.image_urls),
            temperature: options.temperature,
            text: TextConfig {
                format: TextFormat {
                    kind: "json_schema",
                    name: SCHEMA_NAME,
                    schema: target.to_json_schema(),
                    strict: false,
                },
            },
            tools,
            tool_choice,
        };

        tracing::debug!(
            model = %options.model,
            messages = conversation.len(),
            images = options.image_urls.len(),
            web_search = options.web_search,
            "Sending request to OpenAI"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedOutput(format!("unreadable response body: {e}")))?;

        if api_response.status.as_deref() == Some("incomplete") {
            let reason = api_response
                .incomplete_details
                .and_then(|d| d.reason)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(ProviderError::MalformedOutput(format!("response incomplete: {reason}")));
        }

        let mut text = String::new();
        let mut refusal = None;
        for item in api_response.output {
            let OutputItem::Message { content } = item else {
                continue;
            };
            for part in content {
                match part {
                    OutputContent::OutputText { text: chunk } => text.push_str(&chunk),
                    OutputContent::Refusal { refusal: r } => refusal = Some(r),
                    OutputContent::Other => {}
                }
            }
        }

        if text.trim().is_empty() {
            return Err(match refusal {
                Some(r) => ProviderError::Refused(r),
                None => ProviderError::MalformedOutput("no output text".to_string()),
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedOutput(format!("output is not JSON: {e}")))?;

        Ok(target.validate(&value)?)
    }
}
