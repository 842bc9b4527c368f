use super::LLMClient;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::remote::RemoteFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn request_body(config: &LLMConfig, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature.unwrap_or(0.2),
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_tokens,
                candidate_count: 1,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, config: &LLMConfig, prompt: &str) -> Result<String, RemoteFailure> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(RemoteFailure::MissingApiKey)?;
        let base_url = config.base_url.trim_end_matches('/');
        let url = format!("{}/{}:generateContent", base_url, config.model.trim());

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&Self::request_body(config, prompt))
            .send()
            .await
            .map_err(RemoteFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteFailure::from_status(status, text));
        }

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| RemoteFailure::Malformed(format!("Failed to parse JSON: {}", e)))?;

        json.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(RemoteFailure::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(base_url: String) -> LLMConfig {
        LLMConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..LLMConfig::default()
        }
    }

    #[tokio::test]
    async fn returns_first_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "generationConfig": {"candidateCount": 1, "topK": 40},
                "contents": [{"parts": [{"text": "สรุปผล"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]}}]}"#)
            .create_async()
            .await;

        let text = GeminiClient::new()
            .generate(&config(server.url()), "สรุปผล")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(text, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn status_codes_map_to_tagged_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .with_status(429)
            .create_async()
            .await;
        let failure = GeminiClient::new()
            .generate(&config(server.url()), "x")
            .await
            .unwrap_err();
        assert_eq!(failure, RemoteFailure::RateLimited);
    }

    #[tokio::test]
    async fn missing_candidate_text_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
            .create_async()
            .await;
        let failure = GeminiClient::new()
            .generate(&config(server.url()), "x")
            .await
            .unwrap_err();
        assert_eq!(failure, RemoteFailure::EmptyResponse);
    }

    #[tokio::test]
    async fn transport_failure_does_not_leak_the_key() {
        let mut config = config("http://127.0.0.1:9".to_string());
        config.api_key = Some("SECRETKEY123".to_string());

        let failure = GeminiClient::new().generate(&config, "x").await.unwrap_err();
        assert!(!failure.to_string().contains("SECRETKEY123"), "{}", failure);
        assert!(!format!("{:?}", failure).contains("SECRETKEY123"));
    }

    #[tokio::test]
    async fn key_is_not_sent_in_the_query_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_query(Matcher::Missing)
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create_async()
            .await;

        GeminiClient::new()
            .generate(&config(server.url()), "x")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn request_carries_all_safety_settings() {
        let body = serde_json::to_value(GeminiClient::request_body(&LLMConfig::default(), "p")).unwrap();
        let settings = body["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1200);
    }
}
