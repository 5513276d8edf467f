//! Helpers for the git / pull-request driver that consumes a
//! [`SelectionResult`](crate::model::SelectionResult).

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone};

/// Unique branch name for a run: `{prefix}-{YYYYmmdd-HHMMSS}`.
pub fn branch_name<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}", prefix, now.format("%Y%m%d-%H%M%S"))
}

/// Splits a clone URL into `(owner, repo)`.
///
/// ```
/// use advisory_pin::workflow::repo_slug;
///
/// let (owner, repo) = repo_slug("https://github.com/bridgecrewio/terragoat.git").unwrap();
/// assert_eq!((owner.as_str(), repo.as_str()), ("bridgecrewio", "terragoat"));
/// ```
pub fn repo_slug(url: &str) -> Result<(String, String)> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    // Drop the host: `scheme://host/path` or scp-style `user@host:path`.
    let path = if let Some((_, rest)) = trimmed.split_once("://") {
        rest.split_once('/').map(|(_, p)| p).unwrap_or_default()
    } else if let Some((_, rest)) = trimmed.split_once(':') {
        rest
    } else {
        trimmed
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., owner, repo] => Ok((owner.to_string(), repo.to_string())),
        _ => Err(Error::InvalidRepoUrl(url.to_string())),
    }
}
