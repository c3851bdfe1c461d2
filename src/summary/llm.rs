//! Chat-completion client for OpenAI-compatible endpoints (Groq by default).

use std::time::Duration;

use crate::summary::error::{SummaryError, SummaryResult};

/// Produces a completion for a system instruction and a user message.
pub trait LanguageModel {
    fn complete(&self, system: &str, user: &str) -> SummaryResult<String>;
}

/// Configuration for the chat client.
#[derive(Clone)]
pub struct ChatConfig {
    /// API root, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// A chat message for the completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Blocking client for `POST {base_url}/chat/completions`.
pub struct ChatClient {
    config: ChatConfig,
    agent: ureq::Agent,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    /// Request body for a chat completion.
    pub fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        let msgs: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "content": m.content,
                })
            })
            .collect();

        serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
            "stream": false,
        })
    }

    /// Multi-turn chat completion; returns the assistant's reply.
    pub fn chat(&self, messages: &[ChatMessage]) -> SummaryResult<ChatMessage> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = self.request_body(messages);

        let resp = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => SummaryError::Llm {
                    message: format!(
                        "HTTP {code}: {}",
                        resp.into_string().unwrap_or_default()
                    ),
                },
                ureq::Error::Transport(t) => SummaryError::Llm {
                    message: t.to_string(),
                },
            })?;

        let json: serde_json::Value = resp.into_json().map_err(|e| SummaryError::Llm {
            message: format!("failed to parse response: {e}"),
        })?;

        let content = parse_completion(&json)?;
        Ok(ChatMessage {
            role: "assistant".into(),
            content,
        })
    }
}

impl LanguageModel for ChatClient {
    fn complete(&self, system: &str, user: &str) -> SummaryResult<String> {
        let chars = user.chars().count();
        tracing::info!(model = %self.config.model, chars, "requesting summary");
        let reply = self.chat(&[ChatMessage::system(system), ChatMessage::user(user)])?;
        Ok(reply.content)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Assistant text of the first choice.
pub fn parse_completion(json: &serde_json::Value) -> SummaryResult<String> {
    if let Some(message) = json["error"]["message"].as_str() {
        return Err(SummaryError::Llm {
            message: message.to_string(),
        });
    }
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SummaryError::Llm {
            message: "missing 'choices[0].message.content' field".into(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> ChatConfig {
        ChatConfig {
            base_url: "http://127.0.0.1:1/openai/v1".into(),
            model: "llama3-70b-8192".into(),
            api_key: "gsk-test".into(),
            timeout_secs: 2,
        }
    }

    #[test]
    fn request_body_lists_messages_in_order() {
        let client = ChatClient::new(config());
        let body = client.request_body(&[ChatMessage::system("sys"), ChatMessage::user("hi")]);
        assert_eq!(body["model"], "llama3-70b-8192");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn parses_first_choice() {
        let json = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Văn bản yêu cầu...  "}}]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Văn bản yêu cầu...");
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let json = json!({"error": {"message": "Invalid API Key"}});
        let err = parse_completion(&json).unwrap_err();
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn empty_reply_is_an_error() {
        let json = json!({"choices": [{"message": {"content": ""}}]});
        assert!(parse_completion(&json).is_err());
    }

    #[test]
    fn unreachable_endpoint_returns_error() {
        let client = ChatClient::new(config());
        assert!(client.complete("sys", "hello").is_err());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = ChatClient::new(config());
        assert!(!format!("{client:?}").contains("gsk-test"));
    }
}
