//! PR Hosting Client (C18).
//!
//! A thin REST client over the hosting API's pull-request and issue-comment
//! endpoints, built the same way as the structured LLM client (C3): one
//! `reqwest::Client` constructed once with an auth header and a timeout,
//! JSON bodies via `serde`, non-2xx responses mapped to a typed error.
//! `VcsDriver::ensure_pull_request` (C4) and the Review Surface (C5) are
//! thin wrappers over the four operations exposed here; no other component
//! talks to the hosting API directly.

use std::time::Duration;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{make_snippet, HostingError};

const DEFAULT_ENDPOINT: &str = "https://api.github.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrNumber(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub u64);

#[derive(Debug, Clone)]
pub struct HostingConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl HostingConfig {
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug)]
pub struct HostingClient {
    http: reqwest::Client,
    cfg: HostingConfig,
    base_url: String,
}

impl HostingClient {
    pub fn new(cfg: HostingConfig) -> Result<Self, HostingError> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HostingError::InvalidEndpoint {
                endpoint: cfg.endpoint.clone(),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.token))
                .map_err(|_| HostingError::InvalidEndpoint {
                    endpoint: cfg.endpoint.clone(),
                })?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("agentd"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|source| HostingError::HttpTransport { source })?;

        let base_url = format!(
            "{}/repos/{}/{}",
            endpoint.trim_end_matches('/'),
            cfg.owner,
            cfg.repo
        );

        info!(owner = %cfg.owner, repo = %cfg.repo, "HostingClient initialized");

        Ok(Self { http, cfg, base_url })
    }

    pub async fn find_open_pull_request(
        &self,
        head: &str,
        base: &str,
    ) -> Result<Option<PrNumber>, HostingError> {
        let url = format!("{}/pulls", self.base_url);
        let head_param = format!("{}:{}", self.cfg.owner, head);

        debug!(%url, head = %head_param, %base, "GET pulls");

        let resp = self
            .http
            .get(&url)
            .query(&[("head", head_param.as_str()), ("base", base), ("state", "open")])
            .send()
            .await
            .map_err(|source| HostingError::HttpTransport { source })?;

        let resp = self.ensure_success(resp, &url).await?;

        let pulls: Vec<PullRequestResponse> = resp.json().await.map_err(|e| HostingError::Decode {
            reason: e.to_string(),
        })?;

        Ok(pulls.into_iter().next().map(|p| PrNumber(p.number)))
    }

    pub async fn create_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PrNumber, HostingError> {
        let url = format!("{}/pulls", self.base_url);
        let payload = CreatePullRequestBody { title, head, base, body };

        debug!(%url, %head, %base, "POST pulls");

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| HostingError::HttpTransport { source })?;

        let resp = self.ensure_success(resp, &url).await?;

        let created: PullRequestResponse = resp.json().await.map_err(|e| HostingError::Decode {
            reason: e.to_string(),
        })?;

        info!(pr = created.number, %head, %base, "pull request created");
        Ok(PrNumber(created.number))
    }

    pub async fn create_issue_comment(&self, pr: PrNumber, body: &str) -> Result<CommentId, HostingError> {
        let url = format!("{}/issues/{}/comments", self.base_url, pr.0);
        let payload = CommentBody { body };

        debug!(%url, "POST issue comment");

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| HostingError::HttpTransport { source })?;

        let resp = self.ensure_success(resp, &url).await?;

        let created: CommentResponse = resp.json().await.map_err(|e| HostingError::Decode {
            reason: e.to_string(),
        })?;

        Ok(CommentId(created.id))
    }

    /// `PATCH /pulls/{pr}` — used by the Final Flow to replace the PR body
    /// with the ready-for-review message once tests pass.
    pub async fn update_pull_request_body(&self, pr: PrNumber, body: &str) -> Result<(), HostingError> {
        let url = format!("{}/pulls/{}", self.base_url, pr.0);
        let payload = CommentBody { body };

        debug!(%url, "PATCH pull request");

        let resp = self
            .http
            .patch(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| HostingError::HttpTransport { source })?;

        self.ensure_success(resp, &url).await?;
        Ok(())
    }

    pub async fn update_issue_comment(&self, id: CommentId, body: &str) -> Result<(), HostingError> {
        let url = format!("{}/issues/comments/{}", self.base_url, id.0);
        let payload = CommentBody { body };

        debug!(%url, "PATCH issue comment");

        let resp = self
            .http
            .patch(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| HostingError::HttpTransport { source })?;

        self.ensure_success(resp, &url).await?;
        Ok(())
    }

    async fn ensure_success(
        &self,
        resp: reqwest::Response,
        url: &str,
    ) -> Result<reqwest::Response, HostingError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(HostingError::HttpStatus {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatePullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    id: u64,
}
