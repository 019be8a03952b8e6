//! Compliance logging: metadata only, never student data or prompt text.

use std::sync::{Mutex, Once};

use fie_relay::{handle, AnthropicClient, RelayConfig};
use log::{LevelFilter, Log, Metadata, Record};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const STUDENT_MARKER: &str = "STUDENT-NAME-4412";
const PROMPT_MARKER: &str = "SECRET-PROMPT-7731";
const REPORT_TEXT: &str = "Report body";

static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

struct CaptureLogger;

impl Log for CaptureLogger
{   fn enabled(&self, _metadata: &Metadata) -> bool
    {   true
    }

    fn log(&self, record: &Record)
    {   LINES.lock().unwrap().push(format!("{}", record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn init_capture()
{   INIT.call_once(|| {
      log::set_logger(&LOGGER).unwrap();
      log::set_max_level(LevelFilter::Trace);
    });
}

fn captured() -> Vec<String>
{   LINES.lock().unwrap().clone()
}

fn pii_body() -> Vec<u8>
{   serde_json::to_vec(&json!({
      "studentData": {"name": STUDENT_MARKER, "grade": 4}
    , "selectedCriteria": ["Reading", "Math"]
    , "prompt": format!("Write an FIE for {}. {}", STUDENT_MARKER, PROMPT_MARKER)
    })).unwrap()
}

async fn run_all_paths()
{   let ok = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "content": [{"type": "text", "text": REPORT_TEXT}]
      })))
      .mount(&ok)
      .await;

    let limited = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
      .mount(&limited)
      .await;

    let empty = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
      .mount(&empty)
      .await;

    let configs = vec![
      RelayConfig
      {   api_key: Some("sk-test".to_string())
        , api_base: format!("{}/v1", ok.uri())
        , ..RelayConfig::default()
      }
    , RelayConfig
      {   api_key: Some("sk-test".to_string())
        , api_base: format!("{}/v1", limited.uri())
        , ..RelayConfig::default()
      }
    , RelayConfig
      {   api_key: Some("sk-test".to_string())
        , api_base: format!("{}/v1", empty.uri())
        , ..RelayConfig::default()
      }
    , RelayConfig::default()
    ];

    for config in &configs
    {   let client = AnthropicClient::new(config);
        let _ = handle(config, &client, "POST", &pii_body()).await;
    }

    // Caller bugs: payload double-encoded as one JSON string, or truncated.
    let double_encoded = serde_json::to_vec(
      &String::from_utf8(pii_body()).unwrap()
    ).unwrap();
    let mut truncated = pii_body();
    truncated.truncate(truncated.len() - 1);

    let client = AnthropicClient::new(&configs[0]);
    for body in [double_encoded, truncated]
    {   let _ = handle(&configs[0], &client, "POST", &body).await;
    }
}

#[test]
fn no_log_line_contains_student_data_or_prompt()
{   init_capture();
    tokio_test::block_on(run_all_paths());

    let lines = captured();
    assert!(!lines.is_empty());
    for line in &lines
    {   assert!(!line.contains(STUDENT_MARKER), "leaked student data: {}", line);
        assert!(!line.contains(PROMPT_MARKER), "leaked prompt: {}", line);
        assert!(!line.contains("sk-test"), "leaked api key: {}", line);
    }
}

#[test]
fn double_encoded_body_is_missing_fields_without_echo()
{   init_capture();
    let config = RelayConfig
    {   api_key: Some("sk-test".to_string())
      , ..RelayConfig::default()
    };
    let client = AnthropicClient::new(&config);
    let body = serde_json::to_vec(
      &String::from_utf8(pii_body()).unwrap()
    ).unwrap();

    let reply = tokio_test::block_on(handle(&config, &client, "POST", &body));
    assert_eq!(reply.status, 400);
    let shown = serde_json::to_string(&reply.body).unwrap();
    assert!(!shown.contains(STUDENT_MARKER));
    assert!(!shown.contains(PROMPT_MARKER));
}

#[test]
fn success_logs_criteria_count_and_report_length()
{   init_capture();
    tokio_test::block_on(run_all_paths());

    let lines = captured();
    assert!(lines.iter().any(|l| {
      l.contains("FIE Generation Request ID:") && l.contains("Criteria Count: 2")
    }));
    let expected = format!("Length: {} chars", REPORT_TEXT.len());
    assert!(lines.iter().any(|l| {
      l.contains("FIE Generated Successfully") && l.contains(&expected)
    }));
    assert!(!lines.iter().any(|l| l.contains(REPORT_TEXT)));
}
