//! Wire types for the OpenAI-compatible `/chat/completions` endpoint.

use nutri_application::ports::llm_gateway::GatewayError;
use nutri_domain::{Model, Prompt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

/// Plain string for text turns, typed parts for vision turns
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Build the request body for one prompt.
pub(crate) fn build_request(
    model: &Model,
    prompt: &Prompt,
    max_tokens: u32,
    temperature: f64,
) -> ChatRequest {
    let user = match prompt.image() {
        None => MessageContent::Text(prompt.user().to_string()),
        Some(image) => MessageContent::Parts(vec![
            ContentPart::Text {
                text: prompt.user().to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.url.clone(),
                },
            },
        ]),
    };

    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(prompt.system().to_string()),
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        max_tokens,
        temperature,
    }
}

/// Map a non-success HTTP status to a gateway error.
pub(crate) fn status_error(status: u16, body: &str) -> GatewayError {
    let message = body.chars().take(300).collect::<String>();
    match status {
        401 | 403 => GatewayError::AuthenticationFailed(message),
        404 => GatewayError::ModelNotAvailable(message),
        429 => GatewayError::RateLimited(message),
        _ => GatewayError::Http { status, message },
    }
}

/// First choice's text, or an error when the body carries none.
pub(crate) fn extract_content(response: ChatResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| GatewayError::MalformedResponse("no content in first choice".to_string()))
}
