// Oracle Adapter
// External judgment service: sends the document to an OpenAI-compatible
// chat endpoint and parses an AI-probability verdict out of the reply.
// Every failure mode (HTTP error, bad status, malformed JSON, timeout)
// surfaces as OracleError so the engine can degrade to local-only fusion.

use crate::models::OracleJudgment;
use crate::services::config_store::OracleConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

const API_KEY_ENV: &str = "VERITEXT_ORACLE_API_KEY";

const JUDGMENT_SYSTEM_PROMPT: &str = r#"You are an expert at detecting AI-generated text.
Assess whether the given text was produced by an AI generator rather than a human author.
Consider sentence rhythm, lexical variety, personal voice, and structural regularity.

Return ONLY a JSON object with these fields:
- probability: number between 0 and 100, the likelihood the text is AI-generated
- confidence: one of "low", "medium", "high"
- reasoning: one short sentence

Return the JSON object and nothing else."#;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("API key not configured")]
    MissingApiKey,
    #[error("oracle timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawJudgment {
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

pub struct OracleClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
    max_attempts: usize,
}

impl OracleClient {
    pub fn from_config(config: &OracleConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();

        let api_key = config
            .api_key
            .clone()
            .or_else(|| env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty());

        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Ask the oracle for a probability verdict on the whole document.
    /// Retries transient failures with a short backoff; the caller treats
    /// any final error as oracle-unavailable.
    pub async fn judge(
        &self,
        text: &str,
        language: Option<&str>,
    ) -> Result<OracleJudgment, OracleError> {
        let api_key = self.api_key.as_deref().ok_or(OracleError::MissingApiKey)?;

        let user_prompt = match language {
            Some(lang) => format!("Language hint: {lang}\n\nText:\n{text}"),
            None => format!("Text:\n{text}"),
        };

        let mut last_err: Option<OracleError> = None;
        for attempt in 1..=self.max_attempts {
            let started = Instant::now();
            let fut = self.call_chat_api(api_key, &user_prompt);
            let res = tokio::time::timeout(Duration::from_secs(self.timeout_secs), fut).await;

            match res {
                Ok(Ok(content)) => {
                    let judgment = parse_judgment(&content)?;
                    info!(
                        "[ORACLE] verdict probability={:.1} attempt={} latency_ms={}",
                        judgment.probability,
                        attempt,
                        started.elapsed().as_millis()
                    );
                    return Ok(judgment);
                }
                Ok(Err(e)) => {
                    warn!("[ORACLE] attempt={} failed: {}", attempt, e);
                    last_err = Some(e);
                }
                Err(_) => {
                    warn!(
                        "[ORACLE] attempt={} timed out ({}s)",
                        attempt, self.timeout_secs
                    );
                    last_err = Some(OracleError::Timeout(self.timeout_secs));
                }
            }

            if attempt < self.max_attempts {
                let backoff_ms = 400u64 * attempt as u64;
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_err.unwrap_or(OracleError::MissingContent))
    }

    async fn call_chat_api(&self, api_key: &str, user: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: JUDGMENT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: 512,
            temperature: 0.1,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .and_then(|mut cs| cs.drain(..).next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(OracleError::MissingContent)
    }
}

/// Parse a judgment out of possibly sloppy model output: prefer the JSON
/// object, fall back to the first bare number in the reply.
fn parse_judgment(content: &str) -> Result<OracleJudgment, OracleError> {
    let content = content.trim();

    if let Ok(json_str) = extract_json(content) {
        let raw: RawJudgment = serde_json::from_str(&json_str)
            .map_err(|e| OracleError::Json(e.to_string()))?;
        return Ok(OracleJudgment {
            probability: raw.probability.clamp(0.0, 100.0),
            confidence: raw.confidence,
            reasoning: raw.reasoning,
        });
    }

    match first_number(content) {
        Some(value) => Ok(OracleJudgment {
            probability: value.clamp(0.0, 100.0),
            confidence: None,
            reasoning: None,
        }),
        None => Err(OracleError::Json("no JSON or number in response".to_string())),
    }
}

fn extract_json(content: &str) -> Result<String, OracleError> {
    if content.starts_with('{') && content.ends_with('}') {
        return Ok(content.to_string());
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(content[start..=end].to_string()),
        _ => Err(OracleError::Json("no JSON object in response".to_string())),
    }
}

fn first_number(content: &str) -> Option<f64> {
    let digits: String = content
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judgment_json() {
        let content = r#"{"probability": 73.5, "confidence": "high", "reasoning": "uniform rhythm"}"#;
        let judgment = parse_judgment(content).unwrap();
        assert_eq!(judgment.probability, 73.5);
        assert_eq!(judgment.confidence.as_deref(), Some("high"));
    }

    #[test]
    fn test_parse_judgment_json_with_prose_wrapper() {
        let content = "Here is my verdict:\n{\"probability\": 12, \"confidence\": \"low\"}\nDone.";
        let judgment = parse_judgment(content).unwrap();
        assert_eq!(judgment.probability, 12.0);
    }

    #[test]
    fn test_parse_judgment_bare_number_fallback() {
        let judgment = parse_judgment("85").unwrap();
        assert_eq!(judgment.probability, 85.0);
        assert!(judgment.reasoning.is_none());
    }

    #[test]
    fn test_parse_judgment_clamps_out_of_range() {
        let judgment = parse_judgment(r#"{"probability": 250}"#).unwrap();
        assert_eq!(judgment.probability, 100.0);
    }

    #[test]
    fn test_parse_judgment_garbage_is_error() {
        assert!(parse_judgment("no verdict here").is_err());
    }

    #[tokio::test]
    async fn test_judge_without_api_key_is_unavailable() {
        let client = OracleClient::from_config(&OracleConfig {
            enabled: true,
            api_key: None,
            ..OracleConfig::default()
        });
        // Only meaningful when the env var is not set in the test environment.
        if env::var(API_KEY_ENV).is_err() {
            let err = client.judge("some text", None).await.unwrap_err();
            assert!(matches!(err, OracleError::MissingApiKey));
        }
    }
}
