use advisory_pin::{
    apply_pin,
    model::{Advisory, Severity, Vulnerability},
    resolver::{resolve, resolve_from},
    selector::check,
    source::AdvisorySource,
    Config, Error, PinOutcome,
};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::TempDir;

struct StaticSource(Vec<Advisory>);

#[async_trait]
impl AdvisorySource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_advisories(
        &self,
        ecosystem: &str,
        _severity: Severity,
    ) -> advisory_pin::Result<Vec<Advisory>> {
        Ok(self
            .0
            .iter()
            .filter(|a| a.ecosystem == ecosystem)
            .cloned()
            .collect())
    }
}

struct DownSource;

#[async_trait]
impl AdvisorySource for DownSource {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn fetch_advisories(
        &self,
        _ecosystem: &str,
        _severity: Severity,
    ) -> advisory_pin::Result<Vec<Advisory>> {
        Err(Error::SourceUnavailable("connection refused".to_string()))
    }
}

fn advisory(cve: &str, package: &str, range: &str, patched: &str) -> Advisory {
    Advisory::new(cve, "pip", Severity::Critical)
        .with_vulnerability(Vulnerability::new(package, range, patched))
}

/// Twenty advisories where index 7 is the first usable one.
fn feed_with_first_valid_at_seven() -> Vec<Advisory> {
    let mut feed = vec![
        advisory("", "django", "<= 4.2.1", "4.2.2"),
        advisory("CVE-2024-0001", "urllib3", "< 2.0.7", "2.0.7"),
        advisory("CVE-2024-0002", "pillow", ">= 9.0, < 10.0.1", "10.0.1"),
        advisory("CVE-2024-0003", "jinja2", "<= 3.1.2", ""),
        advisory("", "requests", "= 2.31.0", "2.32.0"),
        advisory("CVE-2024-0005", "werkzeug", "< 3.0.1", ""),
        Advisory::new("CVE-2024-0006", "pip", Severity::Critical),
        advisory("CVE-2024-0007", "flask", "<= 2.3.1", "2.3.2"),
    ];
    for i in 8..20 {
        feed.push(advisory(
            &format!("CVE-2024-{:04}", i),
            &format!("pkg{}", i),
            "<= 1.0.0",
            "1.0.1",
        ));
    }
    feed
}

#[test]
fn test_never_accepts_entries_before_first_valid() {
    let feed = feed_with_first_valid_at_seven();
    assert!(feed[..7].iter().all(|a| check(a).is_some()));

    let mut saw_seven = false;
    for seed in 0..200 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = resolve_from(&feed, 20, &mut rng).unwrap();
        let index = feed.iter().position(|a| a.id == result.cve).unwrap();
        assert!(index >= 7, "accepted rejected advisory at index {}", index);
        saw_seven |= index == 7;
    }
    assert!(saw_seven);
}

#[test]
fn test_start_before_seven_converges_on_seven() {
    let mut feed = feed_with_first_valid_at_seven();
    feed.truncate(8);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = resolve_from(&feed, 20, &mut rng).unwrap();
        assert_eq!(result.cve, "CVE-2024-0007");
        assert_eq!(result.package_name, "flask");
        assert_eq!(result.version, "2.3.1");
    }
}

#[tokio::test]
async fn test_resolve_then_pin_end_to_end() {
    let source = StaticSource(vec![
        advisory("", "django", "<= 4.2.1", "4.2.2"),
        advisory("CVE-2023-30861", "flask", "<= 2.3.1", "2.3.2"),
    ]);

    let result = resolve(&source, &Config::default()).await.unwrap();
    assert_eq!(result.cve, "CVE-2023-30861");
    assert_eq!(result.pin(), "flask==2.3.1");

    let checkout = TempDir::new().unwrap();
    let manifest = checkout.path().join("requirements.txt");
    fs::write(&manifest, "django==3.2\n").unwrap();

    let outcome = apply_pin(checkout.path(), &result.package_name, &result.version).unwrap();
    assert_eq!(outcome, PinOutcome::Appended { path: manifest.clone() });
    assert_eq!(fs::read_to_string(&manifest).unwrap(), "django==3.2\n\nflask==2.3.1");
}

#[tokio::test]
async fn test_resolve_with_no_usable_advisory() {
    let source = StaticSource(vec![
        advisory("", "django", "<= 4.2.1", "4.2.2"),
        advisory("", "flask", "<= 2.3.1", "2.3.2"),
    ]);

    let result = resolve(&source, &Config::default()).await;
    assert!(matches!(result, Err(Error::NoCandidateFound { examined: 2 })));
}

#[tokio::test]
async fn test_resolve_filters_by_configured_ecosystem() {
    let source = StaticSource(vec![advisory("CVE-2023-30861", "flask", "<= 2.3.1", "2.3.2")]);
    let config = Config {
        ecosystem: "npm".to_string(),
        ..Config::default()
    };

    let result = resolve(&source, &config).await;
    assert!(matches!(result, Err(Error::NoCandidateFound { examined: 0 })));
}

#[tokio::test]
async fn test_source_failure_is_fatal() {
    let result = resolve(&DownSource, &Config::default()).await;
    assert!(matches!(result, Err(Error::SourceUnavailable(_))));
}
