use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Advisory, Severity, Vulnerability};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const API_VERSION: &str = "2022-11-28";

/// Client for the GitHub global security advisories REST endpoint.
pub struct GithubAdvisorySource {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GithubAdvisorySource {
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("advisory-pin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            per_page,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.token.clone(),
            config.per_page,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[derive(Deserialize)]
struct GhAdvisory {
    #[serde(default)]
    ghsa_id: String,
    cve_id: Option<String>,
    summary: Option<String>,
    severity: Option<String>,
    #[serde(default)]
    vulnerabilities: Vec<GhVulnerability>,
}

#[derive(Deserialize)]
struct GhVulnerability {
    package: Option<GhPackage>,
    vulnerable_version_range: Option<String>,
    first_patched_version: Option<String>,
}

#[derive(Deserialize)]
struct GhPackage {
    ecosystem: Option<String>,
    name: Option<String>,
}

impl GhAdvisory {
    fn into_advisory(self, ecosystem: &str, requested: Severity) -> Advisory {
        let severity = self
            .severity
            .as_deref()
            .and_then(|s| Severity::from_str(s).ok())
            .unwrap_or(requested);

        let ecosystem = self
            .vulnerabilities
            .first()
            .and_then(|v| v.package.as_ref())
            .and_then(|p| p.ecosystem.clone())
            .unwrap_or_else(|| ecosystem.to_string());

        Advisory {
            id: self.cve_id.unwrap_or_default(),
            ghsa_id: self.ghsa_id,
            ecosystem,
            severity,
            summary: self.summary,
            vulnerabilities: self
                .vulnerabilities
                .into_iter()
                .map(|v| Vulnerability {
                    package_name: v.package.and_then(|p| p.name).unwrap_or_default(),
                    vulnerable_version_range: v.vulnerable_version_range.unwrap_or_default(),
                    first_patched_version: v.first_patched_version.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl super::AdvisorySource for GithubAdvisorySource {
    fn name(&self) -> &'static str {
        "GitHub Advisory Database"
    }

    async fn fetch_advisories(
        &self,
        ecosystem: &str,
        min_severity: Severity,
    ) -> Result<Vec<Advisory>> {
        // The endpoint filters on one exact severity, so ask for each level.
        let mut advisories = Vec::new();
        for level in min_severity.at_or_above() {
            advisories.extend(self.fetch_level(ecosystem, level).await?);
        }
        Ok(advisories)
    }
}

impl GithubAdvisorySource {
    async fn fetch_level(&self, ecosystem: &str, severity: Severity) -> Result<Vec<Advisory>> {
        let url = format!("{}/advisories", self.api_url);
        let per_page = self.per_page.to_string();

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .query(&[
                ("ecosystem", ecosystem),
                ("severity", severity.as_str()),
                ("per_page", per_page.as_str()),
            ]);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!("{} returned {}", url, status)));
        }

        let raw: Vec<GhAdvisory> = response.json().await?;
        debug!(count = raw.len(), ecosystem, %severity, "fetched advisories");

        Ok(raw
            .into_iter()
            .map(|a| a.into_advisory(ecosystem, severity))
            .collect())
    }
}
