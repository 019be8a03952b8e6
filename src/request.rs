//! Inbound request and outbound response bodies of the relay

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound generation request as sent by the FIE builder.
/// Fields are kept loosely typed until `validate` runs.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest
{   #[serde(default)]
    pub student_data: Value
  , #[serde(default)]
    pub selected_criteria: Value
  , #[serde(default)]
    pub prompt: Value
}

// Student data and prompt text are PII; only shapes are printable.
impl std::fmt::Debug for GenerationRequest
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("GenerationRequest")
          .field("student_data", &kind_of(&self.student_data))
          .field("selected_criteria", &kind_of(&self.selected_criteria))
          .field("prompt", &kind_of(&self.prompt))
          .finish()
    }
}

fn kind_of(v: &Value) -> &'static str
{   match v
    {   Value::Null => "null"
      , Value::Bool(_) => "bool"
      , Value::Number(_) => "number"
      , Value::String(_) => "string"
      , Value::Array(_) => "array"
      , Value::Object(_) => "object"
    }
}

/// Truthiness as the browser caller understands it:
/// null, false, 0 and "" count as absent.
fn is_present(v: &Value) -> bool
{   match v
    {   Value::Null => false
      , Value::Bool(b) => *b
      , Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(true)
      , Value::String(s) => !s.is_empty()
      , Value::Array(_) | Value::Object(_) => true
    }
}

/// A request that passed boundary validation.
/// `studentData` is only checked for presence; it is not forwarded.
#[derive(Clone)]
pub struct ValidRequest
{   pub selected_criteria: Vec<Value>
  , pub prompt: String
}

impl GenerationRequest
{   /// Check that all three fields are present.
    /// `selectedCriteria` must be a non-empty array and `prompt` a
    /// non-empty string; the inner shape of either is not inspected.
    pub fn validate(self) -> Result<ValidRequest, crate::error::Error>
    {   if !is_present(&self.student_data)
          || !is_present(&self.selected_criteria)
          || !is_present(&self.prompt)
        {   return Err(crate::error::Error::MissingFields);
        }

        let selected_criteria = match self.selected_criteria
        {   Value::Array(items) if !items.is_empty() => items
          , _ => return Err(crate::error::Error::MissingFields)
        };

        let prompt = match self.prompt
        {   Value::String(s) => s
          , _ => return Err(crate::error::Error::MissingFields)
        };

        Ok(ValidRequest
        {   selected_criteria
          , prompt
        })
    }

    /// Parse a raw body. An empty body, or any JSON value that is not
    /// an object, is a request with no fields. Only syntax errors fail,
    /// and their message carries the position, never the body text.
    pub fn from_body(body: &[u8])
      -> Result<Self, crate::error::Error>
    {   if body.iter().all(u8::is_ascii_whitespace)
        {   return Ok(GenerationRequest::default());
        }

        let value: Value = serde_json::from_slice(body)
          .map_err(|e| crate::error::Error::InvalidBody(format!(
            "malformed JSON at line {} column {}", e.line(), e.column()
          )))?;

        let mut fields = match value
        {   Value::Object(map) => map
          , _ => return Ok(GenerationRequest::default())
        };

        let mut take = |name: &str| {
          fields.remove(name).unwrap_or(Value::Null)
        };
        Ok(GenerationRequest
        {   student_data: take("studentData")
          , selected_criteria: take("selectedCriteria")
          , prompt: take("prompt")
        })
    }
}

/// Success body returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody
{   pub success: bool
  , pub report: String
  , pub request_id: String
  , pub timestamp: String
}

/// Error body returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody
{   pub error: String
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>
}

impl ErrorBody
{   pub fn new(error: impl Into<String>) -> Self
    {   ErrorBody
        {   error: error.into()
          , details: None
          , message: None
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self
    {   self.details = Some(details.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self
    {   self.message = Some(message.into());
        self
    }
}

/// Normalized relay response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse
{   Success(SuccessBody)
  , Failure(ErrorBody)
}
