use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{SentimentApiClient, SentimentApiResponse};
use crate::infrastructure::remote::RemoteFailure;

pub const DEFAULT_SSENSE_URL: &str = "https://api.aiforthai.in.th/ssense";

/// AI-for-Thai SSense sentiment endpoint.
pub struct SsenseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SsenseClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn parse(body: &Value) -> Result<SentimentApiResponse, RemoteFailure> {
        let sentiment = body
            .get("sentiment")
            .ok_or_else(|| RemoteFailure::Malformed("missing sentiment".to_string()))?;

        let polarity = match sentiment.get("polarity").and_then(Value::as_str) {
            Some(polarity) if !polarity.trim().is_empty() => polarity.to_string(),
            _ if sentiment.get("polarity-pos").and_then(Value::as_bool) == Some(true) => {
                "positive".to_string()
            }
            _ if sentiment.get("polarity-neg").and_then(Value::as_bool) == Some(true) => {
                "negative".to_string()
            }
            _ => "neutral".to_string(),
        };

        let score = sentiment.get("score").and_then(|score| match score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        });
        // SSense reports percentages
        let score = score.map(|s| {
            let fraction = if s > 1.0 { s / 100.0 } else { s };
            fraction.clamp(0.0, 1.0)
        });

        let preprocess = body.get("preprocess");
        Ok(SentimentApiResponse {
            polarity,
            score,
            positive_words: string_list(preprocess, "pos"),
            negative_words: string_list(preprocess, "neg"),
            keywords: string_list(preprocess, "keyword"),
        })
    }
}

fn string_list(parent: Option<&Value>, key: &str) -> Vec<String> {
    parent
        .and_then(|p| p.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SentimentApiClient for SsenseClient {
    async fn analyze(&self, text: &str) -> Result<SentimentApiResponse, RemoteFailure> {
        let api_key = self.api_key.as_deref().ok_or(RemoteFailure::MissingApiKey)?;

        let response = self
            .client
            .post(&self.base_url)
            .header("Apikey", api_key)
            .form(&[("text", text)])
            .send()
            .await
            .map_err(RemoteFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteFailure::from_status(status, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RemoteFailure::Malformed(e.to_string()))?;
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn parses_polarity_score_and_token_lists() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ssense")
            .match_header("Apikey", "secret")
            .match_body(Matcher::UrlEncoded("text".into(), "ระบบดีมาก".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"sentiment":{"score":"72.5","polarity":"positive"},
                    "preprocess":{"pos":["ดี"],"neg":[],"keyword":["ระบบ"]}}"#,
            )
            .create_async()
            .await;

        let client = SsenseClient::new(
            &format!("{}/ssense", server.url()),
            Some("secret".to_string()),
            5,
        );
        let response = client.analyze("ระบบดีมาก").await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.polarity, "positive");
        assert!((response.score.unwrap() - 0.725).abs() < 1e-9);
        assert_eq!(response.positive_words, vec!["ดี".to_string()]);
        assert!(response.negative_words.is_empty());
        assert_eq!(response.keywords, vec!["ระบบ".to_string()]);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/ssense")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = SsenseClient::new(
            &format!("{}/ssense", server.url()),
            Some("secret".to_string()),
            5,
        );
        let failure = client.analyze("ทดสอบ").await.unwrap_err();
        assert_eq!(
            failure,
            RemoteFailure::Status {
                code: 500,
                body: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling() {
        let client = SsenseClient::new("http://127.0.0.1:9", None, 1);
        assert_eq!(
            client.analyze("ทดสอบ").await.unwrap_err(),
            RemoteFailure::MissingApiKey
        );
    }

    #[test]
    fn body_without_sentiment_is_malformed() {
        let body: Value = serde_json::json!({"preprocess": {}});
        assert!(matches!(
            SsenseClient::parse(&body),
            Err(RemoteFailure::Malformed(_))
        ));
    }

    #[test]
    fn polarity_flags_are_used_when_label_missing() {
        let body: Value = serde_json::json!({"sentiment": {"polarity-neg": true, "score": 40}});
        let response = SsenseClient::parse(&body).unwrap();
        assert_eq!(response.polarity, "negative");
        assert!((response.score.unwrap() - 0.4).abs() < 1e-9);
    }
}
