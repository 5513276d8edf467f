//! Core data types for advisories and selection results.
//!
//! - [`Advisory`] - A security advisory as returned by the feed
//! - [`Vulnerability`] - One affected package inside an advisory
//! - [`Severity`] - Advisory severity used to filter the feed
//! - [`SelectionResult`] - The resolved pin handed to the manifest patcher
//!
//! # Example
//!
//! ```
//! use advisory_pin::model::{Advisory, Severity, Vulnerability};
//!
//! let advisory = Advisory::new("CVE-2023-0001", "pip", Severity::Critical)
//!     .with_vulnerability(Vulnerability::new("flask", "<= 2.3.0", "2.3.1"));
//!
//! assert_eq!(advisory.primary().unwrap().package_name, "flask");
//! ```

mod advisory;

pub use advisory::*;
