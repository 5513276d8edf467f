//! The fetch → select → parse pipeline.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Advisory, SelectionResult};
use crate::range::parse_target_version;
use crate::selector::select_candidate_with;
use crate::source::AdvisorySource;
use rand::Rng;
use tracing::info;

/// Fetches advisories for the configured ecosystem and resolves one pin.
///
/// # Errors
///
/// Any failure is fatal for the run: [`Error::SourceUnavailable`],
/// [`Error::NoCandidateFound`] or [`Error::UnsupportedRangeFormat`].
pub async fn resolve(source: &dyn AdvisorySource, config: &Config) -> Result<SelectionResult> {
    let advisories = fetch(source, config).await?;
    let mut rng = rand::rng();
    resolve_from(&advisories, config.sample_window, &mut rng)
}

/// Fetches the advisory list the way [`resolve`] does.
pub async fn fetch(source: &dyn AdvisorySource, config: &Config) -> Result<Vec<Advisory>> {
    let advisories = source
        .fetch_advisories(&config.ecosystem, config.severity)
        .await?;
    info!(
        source = source.name(),
        ecosystem = %config.ecosystem,
        severity = %config.severity,
        count = advisories.len(),
        "fetched advisories"
    );
    Ok(advisories)
}

/// Selects an advisory from an already fetched list and extracts its pin.
pub fn resolve_from<R: Rng>(
    advisories: &[Advisory],
    window: usize,
    rng: &mut R,
) -> Result<SelectionResult> {
    let advisory = select_candidate_with(advisories, window, rng)?;
    let range = advisory.range();

    let version = parse_target_version(range).map_err(|_| Error::UnsupportedRangeFormat {
        cve: advisory.id.clone(),
        range: range.to_string(),
    })?;

    let vulnerability = advisory.primary();
    Ok(SelectionResult {
        cve: advisory.id.clone(),
        package_name: vulnerability
            .map(|v| v.package_name.clone())
            .unwrap_or_default(),
        version,
        patched_version: vulnerability
            .map(|v| v.first_patched_version.clone())
            .unwrap_or_default(),
    })
}
