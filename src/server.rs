//! axum adapter: every path and method is routed into `handler::handle`.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use log::error;

use crate::config::RelayConfig;
use crate::handler::{handle, RelayReply};
use crate::providers::AnthropicClient;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState
{   pub config: Arc<RelayConfig>
  , pub client: AnthropicClient
}

impl AppState
{   pub fn new(config: RelayConfig) -> Self
    {   let client = AnthropicClient::new(&config);
        AppState
        {   config: Arc::new(config)
          , client
        }
    }
}

pub fn build_router(state: AppState) -> Router
{   Router::new()
      .fallback(relay)
      .with_state(state)
}

async fn relay(
  State(state): State<AppState>
, method: Method
, body: Bytes
) -> Response
{   let reply = handle(
      &state.config
    , &state.client
    , method.as_str()
    , &body
    ).await;
    into_response(reply)
}

fn into_response(reply: RelayReply) -> Response
{   let status = StatusCode::from_u16(reply.status)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = match &reply.body
    {   Some(body) => match serde_json::to_vec(body)
        {   Ok(bytes) => {
              let mut response
                = (status, Body::from(bytes)).into_response();
              response.headers_mut().insert(
                header::CONTENT_TYPE
              , HeaderValue::from_static("application/json")
              );
              response
            }
          , Err(e) => {
              error!("Failed to serialize response body: {}", e);
              StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
      , None => (status, Body::empty()).into_response()
    };

    for (name, value) in reply.headers()
    {   response.headers_mut().insert(
          HeaderName::from_static(*name)
        , HeaderValue::from_static(*value)
        );
    }
    response
}
