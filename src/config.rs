//! Read-only relay configuration, loaded once at process start

use log::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: usize = 1500;
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Relay configuration
#[derive(Clone)]
pub struct RelayConfig
{   /// Provider API key; absence is reported per request, not at startup
    pub api_key: Option<String>
  , /// Provider API base URL, without the trailing `/messages`
    pub api_base: String
  , /// Model identifier sent with every request
    pub model: String
  , /// Maximum output tokens sent with every request
    pub max_tokens: usize
  , /// Value of the `anthropic-version` header
    pub anthropic_version: String
  , /// Socket address the HTTP server listens on
    pub bind_addr: String
}

// The key must never end up in a log line via `{:?}`.
impl std::fmt::Debug for RelayConfig
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("RelayConfig")
          .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
          .field("api_base", &self.api_base)
          .field("model", &self.model)
          .field("max_tokens", &self.max_tokens)
          .field("anthropic_version", &self.anthropic_version)
          .field("bind_addr", &self.bind_addr)
          .finish()
    }
}

impl Default for RelayConfig
{   fn default() -> Self
    {   RelayConfig
        {   api_key: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
          , anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string()
          , bind_addr: DEFAULT_BIND_ADDR.to_string()
        }
    }
}

impl RelayConfig
{   /// Build the configuration from the process environment.
    pub fn from_env() -> Self
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name).filter(|v| !v.trim().is_empty())
        };
        let defaults = RelayConfig::default();

        let max_tokens = match get("CLAUDE_MAX_TOKENS")
        {   Some(raw) => match raw.trim().parse::<usize>()
            {   Ok(n) if n > 0 => n
              , _ => {
                  warn!(
                    "Ignoring invalid CLAUDE_MAX_TOKENS {:?}, using {}",
                    raw, DEFAULT_MAX_TOKENS
                  );
                  DEFAULT_MAX_TOKENS
                }
            }
          , None => defaults.max_tokens
        };

        let config = RelayConfig
        {   api_key: get("CLAUDE_API_KEY")
          , api_base: get("CLAUDE_API_BASE")
              .map(|b| b.trim_end_matches('/').to_string())
              .unwrap_or(defaults.api_base)
          , model: get("CLAUDE_MODEL").unwrap_or(defaults.model)
          , max_tokens
          , anthropic_version: get("ANTHROPIC_VERSION")
              .unwrap_or(defaults.anthropic_version)
          , bind_addr: get("RELAY_BIND_ADDR")
              .unwrap_or(defaults.bind_addr)
        };
        debug!("Loaded {:?}", config);
        config
    }

    /// Full URL of the provider messages endpoint
    pub fn messages_url(&self) -> String
    {   format!("{}/messages", self.api_base)
    }
}
