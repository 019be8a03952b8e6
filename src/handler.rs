//! The relay pipeline: method gate, validation, credential check,
//! one provider call, response shaping.
//!
//! `handle` is independent of any HTTP framework so it can be driven
//! directly from tests or from a different serverless runtime.

use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use rand::Rng;

use crate::config::RelayConfig;
use crate::error::Error;
use crate::providers::AnthropicClient;
use crate::request::{ErrorBody, GenerationRequest, RelayResponse, SuccessBody};

/// Headers set on every response, including errors and preflight.
/// Names are lowercase so they can be used as static header names.
pub const CORS_HEADERS: [(&str, &str); 3] = [
  ("access-control-allow-origin", "*")
, ("access-control-allow-methods", "POST, OPTIONS")
, ("access-control-allow-headers", "Content-Type")
];

pub const REQUEST_ID_LEN: usize = 13;

const REQUEST_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Status plus optional JSON body; `CORS_HEADERS` always apply.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply
{   pub status: u16
  , pub body: Option<RelayResponse>
}

impl RelayReply
{   pub fn empty(status: u16) -> Self
    {   RelayReply { status, body: None }
    }

    pub fn failure(status: u16, body: ErrorBody) -> Self
    {   RelayReply
        {   status
          , body: Some(RelayResponse::Failure(body))
        }
    }

    pub fn success(body: SuccessBody) -> Self
    {   RelayReply
        {   status: 200
          , body: Some(RelayResponse::Success(body))
        }
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)]
    {   &CORS_HEADERS
    }
}

/// Per-request correlation token; not a security value.
pub fn new_request_id() -> String
{   let mut rng = rand::thread_rng();
    (0..REQUEST_ID_LEN)
      .map(|_| {
        let idx = rng.gen_range(0..REQUEST_ID_CHARSET.len());
        REQUEST_ID_CHARSET[idx] as char
      })
      .collect()
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-16T09:30:00.123Z`.
pub fn iso_timestamp() -> String
{   Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Handle one inbound request.
pub async fn handle(
  config: &RelayConfig
, client: &AnthropicClient
, method: &str
, body: &[u8]
) -> RelayReply
{   debug!("Relay request: {} ({} bytes)", method, body.len());

    if method == "OPTIONS"
    {   return RelayReply::empty(200);
    }

    if method != "POST"
    {   return RelayReply::failure(405, ErrorBody::new("Method not allowed"));
    }

    match generate(config, client, body).await
    {   Ok(success) => RelayReply::success(success)
      , Err(e) => e.into_reply()
    }
}

async fn generate(
  config: &RelayConfig
, client: &AnthropicClient
, body: &[u8]
) -> Result<SuccessBody, Error>
{   let request = GenerationRequest::from_body(body)?.validate()?;

    let api_key = config.api_key.as_deref()
      .ok_or(Error::MissingApiKey)?;

    // Compliance: metadata only, never student data or prompt text.
    let timestamp = iso_timestamp();
    let request_id = new_request_id();
    info!(
      "[{}] FIE Generation Request ID: {}, Criteria Count: {}",
      timestamp, request_id, request.selected_criteria.len()
    );

    let report = client.send_prompt(api_key, &request.prompt).await?;

    info!(
      "[{}] FIE Generated Successfully - Request ID: {}, Length: {} chars",
      timestamp, request_id, report.chars().count()
    );

    Ok(SuccessBody
    {   success: true
      , report
      , request_id
      , timestamp
    })
}
