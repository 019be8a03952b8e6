use std::fmt;

use log::error;
use crate::handler::RelayReply;
use crate::request::ErrorBody;

pub const MISSING_FIELDS_MESSAGE: &str
  = "Missing required fields: studentData, selectedCriteria, prompt";

pub const MISSING_API_KEY_MESSAGE: &str
  = "Server configuration error - API key not configured";

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Every way a relay request can fail.
/// Each variant maps to exactly one response shape in `into_reply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// One of studentData / selectedCriteria / prompt is missing or falsy
    MissingFields
  , /// Inbound body is not valid JSON; carries the position only
    InvalidBody(String)
  , /// CLAUDE_API_KEY is not configured
    MissingApiKey
  , /// Provider answered with a non-success status
    Upstream
    {   status: u16
      , status_text: String
      , body: String
    }
  , /// Transport-level failure talking to the provider
    HttpError(String)
  , /// Provider success body could not be parsed
    ParseError(String)
  , /// Provider success body had no `content` sequence
    InvalidResponseFormat
  , /// Provider success body had no usable text chunk
    NoTextContent
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingFields => {
              write!(f, "{}", MISSING_FIELDS_MESSAGE)
            }
          , Error::InvalidBody(msg) => {
              write!(f, "Invalid request body: {}", msg)
            }
          , Error::MissingApiKey => {
              write!(f, "CLAUDE_API_KEY not found in environment variables")
            }
          , Error::Upstream { status, status_text, .. } => {
              write!(f, "Claude API Error: {} {}", status, status_text)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::InvalidResponseFormat => {
              write!(f, "Invalid response format from Claude API.")
            }
          , Error::NoTextContent => {
              write!(f,
                "Claude responded but did not return text content."
              )
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error
{   /// Status code the caller sees for this failure.
    pub fn status(&self) -> u16
    {   match self
        {   Error::MissingFields => 400
          , Error::Upstream { status, .. } => *status
          , _ => 500
        }
    }

    /// Single mapping from failure variant to HTTP status and body.
    /// Server-side detail is logged here and never copied into the
    /// body for the configuration and upstream cases.
    pub fn into_reply(self) -> RelayReply
    {   let status = self.status();
        let body = match self
        {   Error::MissingFields => ErrorBody::new(MISSING_FIELDS_MESSAGE)
          , Error::MissingApiKey => {
              error!("CLAUDE_API_KEY not found in environment variables");
              ErrorBody::new(MISSING_API_KEY_MESSAGE)
            }
          , Error::Upstream { status, status_text, body } => {
              error!("Claude API Error: {} - {}", status, body);
              ErrorBody::new(format!("Claude API Error: {}", status))
                .with_details(status_text)
            }
          , other => {
              error!("Error generating FIE report: {:?}", other);
              ErrorBody::new(INTERNAL_ERROR_MESSAGE)
                .with_message(other.to_string())
            }
        };
        RelayReply::failure(status, body)
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::HttpError(e.to_string())
    }
}
