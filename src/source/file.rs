use crate::error::{Error, Result};
use crate::model::{Advisory, Severity};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads advisories from a JSON array of [`Advisory`] records.
///
/// Filtering happens locally: ecosystem is compared case-insensitively and
/// only advisories at or above the requested severity are kept.
pub struct FileAdvisorySource {
    path: PathBuf,
}

impl FileAdvisorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl super::AdvisorySource for FileAdvisorySource {
    fn name(&self) -> &'static str {
        "Advisory file"
    }

    async fn fetch_advisories(
        &self,
        ecosystem: &str,
        min_severity: Severity,
    ) -> Result<Vec<Advisory>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let advisories: Vec<Advisory> = serde_json::from_str(&content).map_err(|e| {
            Error::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut matching: Vec<Advisory> = advisories
            .into_iter()
            .filter(|a| a.ecosystem.eq_ignore_ascii_case(ecosystem) && a.severity >= min_severity)
            .collect();
        // Same ordering as a per-level feed query; the sort is stable.
        matching.sort_by(|a, b| b.severity.cmp(&a.severity));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vulnerability;
    use crate::source::AdvisorySource;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_filters_by_ecosystem_and_severity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("advisories.json");

        let advisories = vec![
            Advisory::new("CVE-1", "pip", Severity::Critical)
                .with_vulnerability(Vulnerability::new("flask", "<= 1.0", "1.1")),
            Advisory::new("CVE-2", "npm", Severity::Critical),
            Advisory::new("CVE-3", "PIP", Severity::Low),
            Advisory::new("CVE-4", "PIP", Severity::High),
        ];
        std::fs::write(&path, serde_json::to_string(&advisories).unwrap()).unwrap();

        let source = FileAdvisorySource::new(&path);
        let found = source.fetch_advisories("pip", Severity::High).await.unwrap();

        let ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-4"]);
        assert_eq!(found[0].range(), "<= 1.0");
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let source = FileAdvisorySource::new(dir.path().join("nope.json"));

        let result = source.fetch_advisories("pip", Severity::Critical).await;
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }
}
