use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::config::RelayConfig;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

/// Body of a POST to the messages endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderRequest
{   pub model: String
  , pub max_tokens: usize
  , pub messages: Vec<ChatMessage>
}

// Message content is the caller's prompt; keep it out of `{:?}`.
impl std::fmt::Debug for ProviderRequest
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("ProviderRequest")
          .field("model", &self.model)
          .field("max_tokens", &self.max_tokens)
          .field("messages", &self.messages.len())
          .finish()
    }
}

impl ProviderRequest
{   /// Single user message carrying the prompt verbatim.
    pub fn from_prompt(
      prompt: &str
    , model: &str
    , max_tokens: usize
    ) -> Self
    {   ProviderRequest
        {   model: model.to_string()
          , max_tokens
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse
{   /// Ordered chunks; only the `type` and `text` keys are read, so
    /// chunks of any other shape are skipped rather than rejected.
    #[serde(default)]
    pub content: Option<Vec<serde_json::Value>>
}

fn is_text_chunk(chunk: &serde_json::Value) -> bool
{   chunk.get("type").and_then(serde_json::Value::as_str) == Some("text")
}

impl MessagesResponse
{   /// Text of the first textual chunk.
    pub fn into_text(self) -> Result<String, crate::error::Error>
    {   let content = self.content
          .ok_or(crate::error::Error::InvalidResponseFormat)?;

        let text = content.iter()
          .find(|chunk| is_text_chunk(chunk))
          .and_then(|chunk| chunk.get("text"))
          .and_then(serde_json::Value::as_str)
          .filter(|text| !text.is_empty())
          .ok_or(crate::error::Error::NoTextContent)?;
        Ok(text.to_string())
    }
}

/// Parse a provider success body and pull out its text.
/// `content` must be an array when present; any other shape is a format error.
pub fn extract_text(body: &str) -> Result<String, crate::error::Error>
{   let value: serde_json::Value = serde_json::from_str(body)
      .map_err(|e| {
        error!("Parse error: {}", e);
        crate::error::Error::ParseError(e.to_string())
      })?;

    let content = match value
    {   serde_json::Value::Object(mut map) => match map.remove("content")
        {   Some(serde_json::Value::Array(chunks)) => chunks
          , _ => return Err(crate::error::Error::InvalidResponseFormat)
        }
      , _ => return Err(crate::error::Error::InvalidResponseFormat)
    };

    MessagesResponse { content: Some(content) }.into_text()
}

// ===== Anthropic Client =====

/// Thin client over the messages endpoint. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct AnthropicClient
{   http_client: reqwest::Client
  , messages_url: String
  , model: String
  , max_tokens: usize
  , anthropic_version: String
}

impl AnthropicClient
{   pub fn new(config: &RelayConfig) -> Self
    {   debug!("Creating AnthropicClient for {}", config.messages_url());
        AnthropicClient
        {   http_client: reqwest::Client::new()
          , messages_url: config.messages_url()
          , model: config.model.clone()
          , max_tokens: config.max_tokens
          , anthropic_version: config.anthropic_version.clone()
        }
    }

    /// One POST, no retry. Non-success statuses come back as
    /// `Error::Upstream` carrying the raw body for server-side logging.
    pub async fn send_prompt(
      &self
    , api_key: &str
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   let request = ProviderRequest::from_prompt(
          prompt
        , &self.model
        , self.max_tokens
        );

        trace!("Claude request: {:?}", request);

        let response = self.http_client
          .post(&self.messages_url)
          .header("Content-Type", "application/json")
          .header("x-api-key", api_key)
          .header("anthropic-version", &self.anthropic_version)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Claude response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            return Err(crate::error::Error::Upstream
            {   status: status.as_u16()
              , status_text: status.canonical_reason()
                  .unwrap_or("")
                  .to_string()
              , body: error_text
            });
        }

        let body = response.text().await?;
        extract_text(&body)
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::error::Error;

    #[test]
    fn request_carries_prompt_as_single_user_message()
    {   let request = ProviderRequest::from_prompt(
          "Summarize", "claude-3-5-sonnet-20241022", 1500
        );
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Summarize");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn first_text_chunk_wins()
    {   let text = extract_text(r#"{"content":[
          {"type":"tool_use","id":"t1","name":"x","input":{}},
          {"type":"text","text":"first"},
          {"type":"text","text":"second"}
        ]}"#).unwrap();
        assert_eq!(text, "first");
    }

    #[test]
    fn missing_content_is_format_error()
    {   assert_eq!(
          extract_text(r#"{"id":"msg_1"}"#),
          Err(Error::InvalidResponseFormat)
        );
        assert_eq!(
          extract_text(r#"{"content":"nope"}"#),
          Err(Error::InvalidResponseFormat)
        );
    }

    #[test]
    fn no_usable_text_chunk()
    {   assert_eq!(extract_text(r#"{"content":[]}"#), Err(Error::NoTextContent));
        assert_eq!(
          extract_text(r#"{"content":[{"type":"text","text":""}]}"#),
          Err(Error::NoTextContent)
        );
        assert_eq!(
          extract_text(r#"{"content":[{"type":"text"}]}"#),
          Err(Error::NoTextContent)
        );
    }

    #[test]
    fn chunks_without_type_are_skipped()
    {   assert_eq!(
          extract_text(r#"{"content":[{"foo":1},{"type":"text","text":"X"}]}"#),
          Ok("X".to_string())
        );
        assert_eq!(
          extract_text(r#"{"content":[7,{"type":3},{"type":"text","text":"Y"}]}"#),
          Ok("Y".to_string())
        );
    }

    #[test]
    fn first_text_chunk_decides_even_without_text()
    {   assert_eq!(
          extract_text(r#"{"content":[{"type":"text","text":5},{"type":"text","text":"late"}]}"#),
          Err(Error::NoTextContent)
        );
    }

    #[test]
    fn non_json_body_is_parse_error()
    {   assert!(matches!(
          extract_text("<html>"),
          Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn debug_hides_prompt()
    {   let request = ProviderRequest::from_prompt("Jane's IEP", "m", 10);
        assert!(!format!("{:?}", request).contains("Jane"));
    }
}
