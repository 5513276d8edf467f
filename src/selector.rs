//! Candidate selection over an advisory feed.
//!
//! The feed is roughly sorted by recency, so the scan starts at a random
//! index inside the leading window and walks forward from there. The walk
//! wraps past the end and visits every advisory once, so a usable advisory
//! anywhere in the list is always found.

use crate::error::{Error, Result};
use crate::model::Advisory;
use rand::Rng;
use tracing::{debug, info};

/// Number of leading advisories the random start index is drawn from.
pub const DEFAULT_SAMPLE_WINDOW: usize = 20;

/// Why an advisory was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingCve,
    NoVulnerability,
    /// The range only has a strict `<` bound.
    StrictUpperBound,
    Unpatched,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MissingCve => "no CVE id",
            Rejection::NoVulnerability => "no affected package",
            Rejection::StrictUpperBound => "strict less-than range",
            Rejection::Unpatched => "no patched version",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies the exclusion rules in order. `None` means the advisory is usable.
pub fn check(advisory: &Advisory) -> Option<Rejection> {
    if advisory.id.is_empty() {
        return Some(Rejection::MissingCve);
    }

    let Some(vulnerability) = advisory.primary() else {
        return Some(Rejection::NoVulnerability);
    };

    if vulnerability.vulnerable_version_range.contains("< ") {
        return Some(Rejection::StrictUpperBound);
    }

    if vulnerability.first_patched_version.is_empty() {
        return Some(Rejection::Unpatched);
    }

    None
}

/// Picks a usable advisory using the thread-local RNG.
///
/// # Errors
///
/// Returns [`Error::NoCandidateFound`] if `advisories` is empty or every
/// entry is rejected.
pub fn select_candidate(advisories: &[Advisory], window: usize) -> Result<&Advisory> {
    select_candidate_with(advisories, window, &mut rand::rng())
}

/// Same as [`select_candidate`] with a caller-supplied RNG.
pub fn select_candidate_with<'a, R: Rng>(
    advisories: &'a [Advisory],
    window: usize,
    rng: &mut R,
) -> Result<&'a Advisory> {
    let len = advisories.len();
    if len == 0 {
        return Err(Error::NoCandidateFound { examined: 0 });
    }

    let start = rng.random_range(0..window.clamp(1, len));
    debug!(start, len, "scanning advisories");

    for offset in 0..len {
        let index = (start + offset) % len;
        let advisory = &advisories[index];

        match check(advisory) {
            Some(reason) => {
                debug!(
                    index,
                    cve = %advisory.id,
                    range = %advisory.range(),
                    %reason,
                    "rejected advisory"
                );
            }
            None => {
                info!(
                    index,
                    cve = %advisory.id,
                    range = %advisory.range(),
                    "selected advisory"
                );
                return Ok(advisory);
            }
        }
    }

    Err(Error::NoCandidateFound { examined: len })
}
