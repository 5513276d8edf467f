mod cli;
mod json;

pub use cli::print_cli_table;
pub use json::print_json;

use crate::manifest::PinOutcome;
use crate::model::SelectionResult;
use anyhow::Result;
use serde::Serialize;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON for the git/PR driver
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// What a run produced: the resolved pin, what happened to the manifest,
/// or both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinOutcome>,
    /// `owner/repo` the pull request targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

pub fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => print_json(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("table"), Ok(OutputFormat::Table));
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report {
            selection: Some(SelectionResult {
                cve: "CVE-2023-30861".to_string(),
                package_name: "flask".to_string(),
                version: "2.3.1".to_string(),
                patched_version: "2.3.2".to_string(),
            }),
            pin: Some(PinOutcome::Appended {
                path: PathBuf::from("checkout/requirements.txt"),
            }),
            repository: Some("octo/service".to_string()),
            branch: None,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["selection"]["cve"], "CVE-2023-30861");
        assert_eq!(value["selection"]["version"], "2.3.1");
        assert_eq!(value["pin"]["action"], "appended");
        assert_eq!(value["pin"]["path"], "checkout/requirements.txt");
        assert_eq!(value["repository"], "octo/service");
        assert!(value.get("branch").is_none());

        let empty = serde_json::to_value(Report::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
