//! Restoration client for the Gemini API
//!
//! Uses the `generateContent` endpoint with an inline image part, a text
//! part, and `responseModalities: ["IMAGE"]`.

use std::time::{Duration, Instant};

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RestorationConfig;
use crate::error::{Error, Result};

use super::types::{RestorationRequest, RestoredImage};

/// Gemini API base URL
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout (seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Restoration client using the Gemini API
///
/// The API key travels with each call, so one client serves any credential
/// the user selects during a session.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for GeminiClient
pub struct GeminiClientBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Set the base URL (defaults to the public Gemini endpoint)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the GeminiClient
    pub fn build(self) -> Result<GeminiClient> {
        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::NetworkError)?;

        Ok(GeminiClient {
            http_client,
            base_url: self
                .base_url
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

impl GeminiClient {
    /// Create a client against the public endpoint
    pub fn new() -> Result<Self> {
        GeminiClientBuilder::new().build()
    }

    /// Create a new builder
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Create a client from the restoration section of the config
    pub fn from_config(config: &RestorationConfig) -> Result<Self> {
        GeminiClientBuilder::new()
            .base_url(config.base_url.clone())
            .timeout_secs(config.timeout_secs)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the photo and instruction, returning the restored image
    pub async fn restore(
        &self,
        request: &RestorationRequest,
        api_key: &str,
    ) -> Result<RestoredImage> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = build_request_body(request);

        debug!(
            model = %request.model,
            mime_type = %request.mime_type,
            strength = request.strength.value(),
            "Sending restoration request"
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteApi(describe_error_response(status.as_u16(), &body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::RemoteApi(format!("Failed to parse response: {}", e)))?;

        let generation_time = start.elapsed().as_millis() as u64;
        extract_image(parsed, &request.model, generation_time)
    }
}

/// Request body: inline image first, instruction second
fn build_request_body(request: &RestorationRequest) -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "data": request.image_base64,
                        "mimeType": request.mime_type
                    }
                },
                {
                    "text": request.build_prompt()
                }
            ]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"]
        }
    })
}

/// Take the first inline image of the first candidate
fn extract_image(
    response: GenerateContentResponse,
    model: &str,
    generation_time_ms: u64,
) -> Result<RestoredImage> {
    let candidate = response.candidates.into_iter().next();

    if let Some(content) = candidate.as_ref().and_then(|c| c.content.as_ref()) {
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                return RestoredImage::from_inline_data(
                    &inline.mime_type,
                    &inline.data,
                    model,
                    generation_time_ms,
                );
            }
        }
    }

    let reason = response
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .map(|r| format!("prompt blocked ({})", r))
        .or_else(|| {
            candidate
                .as_ref()
                .and_then(|c| c.finish_reason.clone())
                .filter(|r| r != "STOP")
                .map(|r| format!("finish reason {}", r))
        })
        .or_else(|| {
            candidate
                .as_ref()
                .and_then(|c| c.content.as_ref())
                .and_then(|content| content.parts.iter().find_map(|p| p.text.clone()))
        })
        .unwrap_or_else(|| "no image in response".to_string());

    Err(Error::ModelRefusal(reason))
}

/// Render an error body so that the API's own markers survive verbatim
fn describe_error_response(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let error = envelope.error;
            let mut markers = Vec::new();
            if let Some(code) = error.status {
                markers.push(code);
            }
            markers.extend(error.details.into_iter().filter_map(|d| d.reason));

            if markers.is_empty() {
                format!("{} (HTTP {})", error.message, status)
            } else {
                format!("{} (HTTP {}, {})", error.message, status, markers.join(", "))
            }
        }
        Err(_) if body.trim().is_empty() => format!("HTTP error {}", status),
        Err(_) => format!("HTTP error {}: {}", status, body.trim()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::Strength;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_builder_trims_base_url() {
        let client = GeminiClientBuilder::new()
            .base_url("http://localhost:9000/v1beta/")
            .timeout_secs(5)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/v1beta");
    }

    #[test]
    fn test_default_client_targets_gemini() {
        let client = GeminiClient::new().unwrap();
        assert_eq!(client.base_url(), GEMINI_BASE_URL);
    }

    #[test]
    fn test_request_body_shape() {
        let request = RestorationRequest::new("AAAA", "image/jpeg", Strength::new(75));
        let body = build_request_body(&request);

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[1]["text"].as_str().unwrap().contains("75%"));
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_extract_first_inline_image() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your photo"},
                {"inlineData":{"mimeType":"image/png","data":"AQID"}},
                {"inlineData":{"mimeType":"image/jpeg","data":"BAUG"}}
            ]},"finishReason":"STOP"}]}"#,
        );

        let image = extract_image(response, "gemini-2.5-flash-image", 40).unwrap();
        assert_eq!(image.data_uri, "data:image/png;base64,AQID");
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.model_used, "gemini-2.5-flash-image");
        assert_eq!(image.generation_time_ms, 40);
    }

    #[test]
    fn test_blocked_prompt_is_a_refusal() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_image(response, "m", 0).unwrap_err();
        match err {
            Error::ModelRefusal(reason) => assert!(reason.contains("SAFETY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_text_only_answer_is_a_refusal() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"I cannot edit this image."}]},"finishReason":"STOP"}]}"#,
        );
        let err = extract_image(response, "m", 0).unwrap_err();
        match err {
            Error::ModelRefusal(reason) => assert_eq!(reason, "I cannot edit this image."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_candidates_is_a_refusal() {
        let err = extract_image(parse("{}"), "m", 0).unwrap_err();
        assert!(matches!(err, Error::ModelRefusal(ref r) if r == "no image in response"));
    }

    #[test]
    fn test_describe_invalid_key_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let text = describe_error_response(400, body);
        assert_eq!(
            text,
            "API key not valid. Please pass a valid API key. (HTTP 400, INVALID_ARGUMENT, API_KEY_INVALID)"
        );
    }

    #[test]
    fn test_describe_not_found_error() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let text = describe_error_response(404, body);
        assert!(text.starts_with("Requested entity was not found."));
    }

    type Seen = std::sync::Arc<std::sync::Mutex<Vec<(String, String, serde_json::Value)>>>;

    /// Local stand-in for the Gemini endpoint; records path, key and body
    async fn serve_gemini(
        status: warp::http::StatusCode,
        reply: serde_json::Value,
    ) -> (GeminiClient, Seen) {
        use warp::Filter;

        let seen = Seen::default();
        let recorded = seen.clone();
        let route = warp::post()
            .and(warp::path!("v1beta" / "models" / String))
            .and(warp::header::<String>("x-goog-api-key"))
            .and(warp::body::json::<serde_json::Value>())
            .map(move |segment: String, key: String, body: serde_json::Value| {
                recorded.lock().unwrap().push((segment, key, body));
                warp::reply::with_status(warp::reply::json(&reply), status)
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let client = GeminiClient::builder()
            .base_url(format!("http://{}/v1beta", addr))
            .timeout_secs(5)
            .build()
            .unwrap();
        (client, seen)
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let reply = json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AQID"}}]},
                "finishReason": "STOP"
            }]
        });
        let (client, seen) = serve_gemini(warp::http::StatusCode::OK, reply).await;
        let request = RestorationRequest::new("/9j/4AAQ", "image/jpeg", Strength::new(75));

        let image = client.restore(&request, "test-key").await.unwrap();
        assert_eq!(image.data_uri, "data:image/png;base64,AQID");
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.model_used, "gemini-2.5-flash-image");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (segment, key, body) = &seen[0];
        assert_eq!(segment, "gemini-2.5-flash-image:generateContent");
        assert_eq!(key, "test-key");
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/4AAQ");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[1]["text"].as_str().unwrap().ends_with("75%."));
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[tokio::test]
    async fn test_restore_invalid_key_keeps_markers() {
        let reply = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID"
                }]
            }
        });
        let (client, seen) = serve_gemini(warp::http::StatusCode::BAD_REQUEST, reply).await;
        let request = RestorationRequest::new("AAAA", "image/png", Strength::default());

        let err = client.restore(&request, "bad-key").await.unwrap_err();
        match err {
            Error::RemoteApi(text) => {
                assert_eq!(
                    text,
                    "API key not valid. Please pass a valid API key. (HTTP 400, INVALID_ARGUMENT, API_KEY_INVALID)"
                );
                assert_eq!(
                    crate::restoration::classify::classify_message(&text),
                    Some(crate::restoration::CredentialIssue::KeyRejected)
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(seen.lock().unwrap()[0].1, "bad-key");
    }

    #[tokio::test]
    async fn test_restore_unreachable_host_is_network_error() {
        let client = GeminiClient::builder()
            .base_url("http://127.0.0.1:9/v1beta")
            .timeout_secs(2)
            .build()
            .unwrap();
        let request = RestorationRequest::new("AAAA", "image/png", Strength::default());

        let err = client.restore(&request, "key").await.unwrap_err();
        assert_eq!(err.code(), "E203");
    }

    #[test]
    fn test_describe_non_json_error() {
        assert_eq!(describe_error_response(502, "  "), "HTTP error 502");
        assert_eq!(
            describe_error_response(503, "upstream overloaded"),
            "HTTP error 503: upstream overloaded"
        );
    }
}
