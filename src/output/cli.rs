use super::Report;
use crate::manifest::PinOutcome;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct SelectionRow {
    #[tabled(rename = "CVE")]
    cve: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Pin")]
    pin: String,
    #[tabled(rename = "Patched In")]
    patched_in: String,
}

pub fn print_cli_table(report: &Report) -> Result<()> {
    println!();

    if let Some(selection) = &report.selection {
        let row = SelectionRow {
            cve: selection.cve.clone(),
            package: truncate(&selection.package_name, 40),
            pin: selection.pin(),
            patched_in: if selection.patched_version.is_empty() {
                "-".to_string()
            } else {
                selection.patched_version.clone()
            },
        };

        let table = Table::new(vec![row]).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if let Some(pin) = &report.pin {
        println!();
        println!("{}", describe_pin(pin));
    }

    if let Some(repository) = &report.repository {
        println!("Repository: {}", repository);
    }
    if let Some(branch) = &report.branch {
        println!("Branch:     {}", branch);
    }

    Ok(())
}

fn describe_pin(pin: &PinOutcome) -> String {
    match pin {
        PinOutcome::Replaced { path } => format!("\x1b[32mUpdated\x1b[0m {}", path.display()),
        PinOutcome::Appended { path } => format!("\x1b[32mAppended to\x1b[0m {}", path.display()),
        PinOutcome::NoManifest => "\x1b[33mNo requirements.txt found, nothing pinned\x1b[0m".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("flask", 40), "flask");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_describe_pin() {
        let path = PathBuf::from("requirements.txt");
        assert!(describe_pin(&PinOutcome::Replaced { path: path.clone() }).contains("Updated"));
        assert!(describe_pin(&PinOutcome::Appended { path }).contains("Appended"));
        assert!(describe_pin(&PinOutcome::NoManifest).contains("nothing pinned"));
    }
}
