//! Vulnerable-version-range parsing.
//!
//! Advisory ranges are free-form text such as `"<= 1.4.2"`, `"= 2.0.0"` or
//! `">= 1.0, < 1.2"`. Only the upper-inclusive and exact forms yield a
//! concrete version; everything else is reported as unsupported.

use crate::error::{Error, Result};
use serde::Serialize;

/// Characters that belong to range operators and never to a version token.
const OPERATOR_CHARS: [char; 5] = ['<', '>', '=', '!', '~'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOp {
    LessOrEqual,
    Equal,
    /// Strict upper bound. Deriving a concrete version would need decrement
    /// arithmetic, which is not done.
    LessThan,
    Unknown,
}

/// Parsed form of a range string: the winning operator and its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    pub op: RangeOp,
    pub boundary: String,
}

impl VersionRange {
    /// Classifies `text` by the first matching marker, in precedence order
    /// `<=`, bare `=`, `<`.
    pub fn parse(text: &str) -> Self {
        if let Some(pos) = text.find("<=") {
            return Self::new(RangeOp::LessOrEqual, &text[pos + 2..]);
        }

        if let Some((pos, len)) = find_bare_equals(text) {
            return Self::new(RangeOp::Equal, &text[pos + len..]);
        }

        if let Some(pos) = text.find('<') {
            return Self::new(RangeOp::LessThan, &text[pos + 1..]);
        }

        Self {
            op: RangeOp::Unknown,
            boundary: String::new(),
        }
    }

    fn new(op: RangeOp, rest: &str) -> Self {
        Self {
            op,
            boundary: next_token(rest).to_string(),
        }
    }

    /// The concrete version to pin, if this range form yields one.
    ///
    /// A boundary that still carries operator characters (`"<==1.0"` leaves
    /// `"=1.0"`) is not a version and yields `None`.
    pub fn target_version(&self) -> Option<&str> {
        match self.op {
            RangeOp::LessOrEqual | RangeOp::Equal if is_version_token(&self.boundary) => {
                Some(&self.boundary)
            }
            _ => None,
        }
    }
}

/// Extracts the version to pin from an advisory's range text.
///
/// # Errors
///
/// Returns [`Error::UnsupportedRangeFormat`] when the text has neither a
/// `<=` nor a bare `=` marker followed by a version token.
///
/// # Example
///
/// ```
/// use advisory_pin::range::parse_target_version;
///
/// assert_eq!(parse_target_version("<= 1.2.3").unwrap(), "1.2.3");
/// assert_eq!(parse_target_version("= 2.0.0").unwrap(), "2.0.0");
/// assert!(parse_target_version("< 1.0.0").is_err());
/// ```
pub fn parse_target_version(range_text: &str) -> Result<String> {
    VersionRange::parse(range_text)
        .target_version()
        .map(str::to_string)
        .ok_or_else(|| Error::UnsupportedRangeFormat {
            cve: String::new(),
            range: range_text.to_string(),
        })
}

/// Position and width of an equality marker that is not part of `<=`, `>=`
/// or `!=`. `==` counts as one two-character marker.
fn find_bare_equals(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
            let doubled = bytes.get(i + 1) == Some(&b'=');
            if !matches!(prev, Some(b'<') | Some(b'>') | Some(b'!')) {
                return Some((i, if doubled { 2 } else { 1 }));
            }
            if doubled {
                i += 1;
            }
        }
        i += 1;
    }
    None
}

fn is_version_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(OPERATOR_CHARS)
}

fn next_token(rest: &str) -> &str {
    rest.trim_start()
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or_default()
}
