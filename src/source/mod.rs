//! Advisory feeds.
//!
//! [`AdvisorySource`] is the seam between the resolver and wherever
//! advisories come from. [`GithubAdvisorySource`] queries the GitHub global
//! security advisory database; [`FileAdvisorySource`] replays a JSON dump of
//! [`Advisory`] records for offline runs.

mod file;
mod github;

pub use file::FileAdvisorySource;
pub use github::GithubAdvisorySource;

use crate::error::Result;
use crate::model::{Advisory, Severity};
use async_trait::async_trait;

#[async_trait]
pub trait AdvisorySource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns advisories for `ecosystem` whose severity is `min_severity`
    /// or higher, most severe level first and feed order within a level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`](crate::Error::SourceUnavailable)
    /// if the feed cannot be reached or answers with an error.
    async fn fetch_advisories(
        &self,
        ecosystem: &str,
        min_severity: Severity,
    ) -> Result<Vec<Advisory>>;
}
