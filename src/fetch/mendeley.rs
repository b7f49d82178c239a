// file: src/fetch/mendeley.rs
// description: Mendeley API client for pulling library metadata
// reference: https://dev.mendeley.com/reference/topics/authorization_auth_code.html

use crate::config::MendeleyConfig;
use crate::error::{PipelineError, Result};
use crate::models::Record;
use crate::parser::MendeleyDocument;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const DOCUMENT_PAGE_LIMIT: &str = "500";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct MendeleyClient {
    client: Client,
    api_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl MendeleyClient {
    /// Credentials come from the `mendeley` config section or its environment overrides.
    pub fn from_config(config: &MendeleyConfig) -> Result<Self> {
        let client_id = config.client_id.clone().filter(|s| !s.is_empty()).ok_or_else(|| {
            PipelineError::Config(
                "mendeley.client_id is not set (LITREVIEW__MENDELEY__CLIENT_ID)".to_string(),
            )
        })?;
        let client_secret = config
            .client_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                PipelineError::Config(
                    "mendeley.client_secret is not set (LITREVIEW__MENDELEY__CLIENT_SECRET)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            redirect_uri: config.redirect_uri.clone(),
        })
    }

    pub fn authorize_url(&self) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/oauth/authorize", self.api_base),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", "all"),
            ],
        )
        .map_err(|e| PipelineError::Config(format!("Invalid Mendeley API base: {}", e)))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let url = format!("{}/oauth/token", self.api_base);
        debug!("Exchanging authorization code at {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Api(format!(
                "Token request failed with status {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    pub async fn fetch_documents(&self, token: &str) -> Result<Vec<MendeleyDocument>> {
        let url = format!("{}/documents", self.api_base);

        let response = self
            .client
            .get(&url)
            .query(&[("view", "all"), ("limit", DOCUMENT_PAGE_LIMIT)])
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Api(format!(
                "Document request failed with status {}: {}",
                status, error_text
            )));
        }

        let documents: Vec<MendeleyDocument> = response.json().await?;
        info!("Fetched {} documents from Mendeley", documents.len());
        Ok(documents)
    }
}

/// Pulls the `code` query parameter out of the pasted redirect URL; a bare code passes through.
pub fn extract_code(redirect: &str) -> Option<String> {
    let redirect = redirect.trim();
    if let Ok(url) = Url::parse(redirect) {
        return url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .filter(|c| !c.is_empty());
    }
    Some(redirect.to_string()).filter(|c| !c.is_empty() && !c.contains(char::is_whitespace))
}

pub fn documents_to_records(documents: Vec<MendeleyDocument>) -> Vec<Record> {
    documents
        .into_iter()
        .map(MendeleyDocument::into_record)
        .collect()
}

pub fn save_metadata(records: &[Record], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(|e| PipelineError::file_operation(path, e))?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}
