//! LanguageTool grammar checker.
//!
//! Calls the LanguageTool HTTP API (`/v2/check`), either the public
//! server or a self-hosted instance.

use async_trait::async_trait;
use lexqual_core::LanguageToolConfig;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::trait_::{GrammarChecker, Issue, IssueCategory, ProviderError, Result};

/// LanguageTool API client.
#[derive(Clone)]
pub struct LanguageToolClient {
    /// HTTP client
    client: Client,

    /// LanguageTool server URL
    url: String,

    /// Language code
    language: String,

    /// Rule ids counted as spelling issues
    spelling_rules: Vec<String>,
}

impl LanguageToolClient {
    /// Create a new client from configuration.
    pub fn new(config: &LanguageToolConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.timeout())
                .build()
                .unwrap_or_default(),
            url: config.url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            spelling_rules: config.spelling_rules.clone(),
        }
    }

    /// Map a LanguageTool match to an issue.
    ///
    /// Only the configured spelling rules count as spelling; every other
    /// match is categorized by its rule category.
    fn to_issue(&self, m: CheckMatch) -> Issue {
        let category = if self.spelling_rules.iter().any(|r| *r == m.rule.id) {
            IssueCategory::Spelling
        } else {
            category_from_id(&m.rule.category.id)
        };
        Issue::new(category, m.offset, m.length)
    }
}

fn category_from_id(id: &str) -> IssueCategory {
    match id {
        "TYPOS"
        | "GRAMMAR"
        | "CONFUSED_WORDS"
        | "CASING"
        | "COLLOCATIONS"
        | "NONSTANDARD_PHRASES" => IssueCategory::Grammar,
        "PUNCTUATION" => IssueCategory::Punctuation,
        "TYPOGRAPHY" => IssueCategory::Typography,
        "STYLE" | "REDUNDANCY" | "PLAIN_ENGLISH" | "REPETITIONS_STYLE" => IssueCategory::Style,
        _ => IssueCategory::Other,
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<CheckMatch>,
}

#[derive(Debug, Deserialize)]
struct CheckMatch {
    offset: usize,
    length: usize,
    rule: CheckRule,
}

#[derive(Debug, Deserialize)]
struct CheckRule {
    id: String,
    category: RuleCategory,
}

#[derive(Debug, Deserialize)]
struct RuleCategory {
    id: String,
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<Issue>> {
        debug!("Checking text ({} chars) with LanguageTool", text.len());

        let response = self
            .client
            .post(format!("{}/v2/check", self.url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                service: "LanguageTool",
                status,
                body,
            });
        }

        let data: CheckResponse = response.json().await?;
        Ok(data.matches.into_iter().map(|m| self.to_issue(m)).collect())
    }
}
