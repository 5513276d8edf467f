use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Query-string value understood by the advisory feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// This level and every level above it, most severe first.
    pub fn at_or_above(self) -> impl Iterator<Item = Severity> {
        [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
        .into_iter()
        .filter(move |level| *level >= self)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "moderate" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Unknown severity: {}. Use 'low', 'medium', 'high', or 'critical'",
                s
            )),
        }
    }
}

/// One affected package inside an advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub package_name: String,
    /// Raw range text as authored in the advisory, e.g. `">= 1.0, <= 1.4.2"`.
    pub vulnerable_version_range: String,
    /// Empty when no fix has been released.
    pub first_patched_version: String,
}

impl Vulnerability {
    pub fn new(
        package_name: impl Into<String>,
        vulnerable_version_range: impl Into<String>,
        first_patched_version: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            vulnerable_version_range: vulnerable_version_range.into(),
            first_patched_version: first_patched_version.into(),
        }
    }
}

/// A security advisory for one ecosystem.
///
/// Identity is the CVE id; advisories published without one carry an
/// empty `id` and are never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ghsa_id: String,
    pub ecosystem: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl Advisory {
    pub fn new(id: impl Into<String>, ecosystem: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            ghsa_id: String::new(),
            ecosystem: ecosystem.into(),
            severity,
            summary: None,
            vulnerabilities: Vec::new(),
        }
    }

    pub fn with_vulnerability(mut self, vulnerability: Vulnerability) -> Self {
        self.vulnerabilities.push(vulnerability);
        self
    }

    pub fn with_ghsa_id(mut self, ghsa_id: impl Into<String>) -> Self {
        self.ghsa_id = ghsa_id.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// The vulnerability entry consulted for selection. Only the first is used.
    pub fn primary(&self) -> Option<&Vulnerability> {
        self.vulnerabilities.first()
    }

    /// Range text of the primary vulnerability, empty if there is none.
    pub fn range(&self) -> &str {
        self.primary()
            .map(|v| v.vulnerable_version_range.as_str())
            .unwrap_or_default()
    }
}

/// The pin resolved from the selected advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub cve: String,
    pub package_name: String,
    /// Concrete version token extracted from the range, never a range itself.
    pub version: String,
    pub patched_version: String,
}

impl SelectionResult {
    /// The manifest line this result pins, `name==version`.
    pub fn pin(&self) -> String {
        format!("{}=={}", self.package_name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from_str("critical"), Ok(Severity::Critical));
        assert_eq!(Severity::from_str("HIGH"), Ok(Severity::High));
        assert_eq!(Severity::from_str("moderate"), Ok(Severity::Medium));
        assert_eq!(Severity::from_str("low"), Ok(Severity::Low));
        assert!(Severity::from_str("severe").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_at_or_above() {
        let levels: Vec<Severity> = Severity::High.at_or_above().collect();
        assert_eq!(levels, vec![Severity::Critical, Severity::High]);
        assert_eq!(Severity::Low.at_or_above().count(), 4);
        assert_eq!(Severity::Critical.at_or_above().collect::<Vec<_>>(), vec![Severity::Critical]);
    }

    #[test]
    fn test_advisory_range_without_vulnerabilities() {
        let advisory = Advisory::new("CVE-2024-1", "pip", Severity::High);
        assert!(advisory.primary().is_none());
        assert_eq!(advisory.range(), "");
    }

    #[test]
    fn test_only_first_vulnerability_is_primary() {
        let advisory = Advisory::new("CVE-2024-2", "pip", Severity::High)
            .with_vulnerability(Vulnerability::new("requests", "<= 2.31.0", "2.32.0"))
            .with_vulnerability(Vulnerability::new("urllib3", "< 2.0.7", "2.0.7"));

        assert_eq!(advisory.range(), "<= 2.31.0");
        assert_eq!(advisory.primary().unwrap().package_name, "requests");
    }

    #[test]
    fn test_selection_result_pin() {
        let result = SelectionResult {
            cve: "CVE-2023-30861".to_string(),
            package_name: "flask".to_string(),
            version: "2.3.1".to_string(),
            patched_version: "2.3.2".to_string(),
        };
        assert_eq!(result.pin(), "flask==2.3.1");
    }
}
