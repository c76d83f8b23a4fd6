//! Gemini `generateContent` client used as the advice source.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tally_finance::AdviceSource;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl GeminiAdvisor {
    /// `None` when no API key is configured.
    pub fn from_config(cfg: &Config) -> Option<Self> {
        let api_key = cfg.api_key()?;
        Some(Self {
            client: reqwest::Client::new(),
            base_url: cfg.advisor.base_url.trim_end_matches('/').to_string(),
            model: cfg.advisor.model.clone(),
            temperature: cfg.advisor.temperature,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Req<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    text: Option<String>,
}

/// Concatenated text parts of the first candidate.
fn response_text(resp: Resp) -> String {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl AdviceSource for GeminiAdvisor {
    async fn advise(&self, prompt: &str) -> Result<String> {
        let body = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        log::debug!("requesting advice from {}", self.model);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse gemini response")?;
        Ok(response_text(out))
    }
}
