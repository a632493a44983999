//! Narrative text from the remote generation endpoint.
//!
//! The endpoint takes `{ "prompt": ... }` and answers `{ "response": ... }`, or
//! `{ "error": ... }` when the upstream model call fails. The response is split
//! into an introduction and a reaction sentence.

use crate::error::{EoError, EoResult};
use crate::model::{Narrative, PresidentCount};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Phrases that open the reaction sentence. The earliest match wins.
pub const REACTION_OPENERS: &[&str] = &[
    "Wow",
    "Whoa",
    "Yikes",
    "Impressive",
    "Interesting",
    "Talk about",
    "That's",
];

pub const FALLBACK_REACTION: &str = "That's quite a pace for the first days in office.";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
It is day {days} of {president}'s term. Executive orders signed so far, per president, \
over the same number of days:
{counts}
Write a short, neutral introduction to this comparison, then one reaction sentence.";

/// Facts substituted into the prompt template.
#[derive(Debug, Clone)]
pub struct PromptFacts<'a> {
    pub days: u32,
    pub president: &'a str,
    pub counts: &'a [PresidentCount],
}

pub fn compose_prompt(template: &str, facts: &PromptFacts<'_>) -> String {
    let counts = facts
        .counts
        .iter()
        .map(|c| format!("{}: {}", c.president, c.count))
        .collect::<Vec<_>>()
        .join("\n");
    template
        .replace("{days}", &facts.days.to_string())
        .replace("{president}", facts.president)
        .replace("{counts}", &counts)
}

/// Split generated text at the first reaction opener.
///
/// Returns `(introduction, reaction)` as the exact slices `text[..k]` and
/// `text[k..]`; whitespace is left for the display layer. Without an opener the
/// whole text is the introduction and the reaction is [`FALLBACK_REACTION`].
pub fn split_narrative(text: &str) -> (String, String) {
    let first = REACTION_OPENERS
        .iter()
        .filter_map(|opener| text.find(opener))
        .min();
    match first {
        Some(k) => (text[..k].to_string(), text[k..].to_string()),
        None => (text.to_string(), FALLBACK_REACTION.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct PromptResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct NarrativeClient {
    client: reqwest::Client,
    url: String,
}

impl NarrativeClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Send a prompt and return the raw generated text.
    pub async fn generate(&self, prompt: &str) -> EoResult<String> {
        let resp = self
            .client
            .post(&self.url)
            .json(&PromptRequest { prompt })
            .send()
            .await
            .map_err(|e| EoError::network(&self.url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EoError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }
        let body = resp
            .text()
            .await
            .map_err(|e| EoError::network(&self.url, e))?;
        let parsed: PromptResponse =
            serde_json::from_str(&body).map_err(|source| EoError::Json {
                origin: self.url.clone(),
                source,
            })?;
        match (parsed.response, parsed.error) {
            (Some(text), _) if !text.trim().is_empty() => Ok(text),
            (_, Some(err)) => Err(EoError::shape(&self.url, format!("generator error: {err}"))),
            _ => Err(EoError::shape(&self.url, "no \"response\" text")),
        }
    }

    /// Fetch and split the narrative. Any failure degrades to
    /// [`Narrative::Unavailable`] so the chart can still render.
    pub async fn narrative(&self, prompt: &str) -> Narrative {
        match self.generate(prompt).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "narrative received");
                let (introduction, reaction) = split_narrative(&text);
                Narrative::Ready {
                    introduction,
                    reaction,
                }
            }
            Err(e) => {
                warn!(error = %e, "narrative unavailable");
                Narrative::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
