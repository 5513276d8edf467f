pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod output;
pub mod range;
pub mod resolver;
pub mod selector;
pub mod source;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use manifest::{apply_pin, PinOutcome};
pub use model::{Advisory, SelectionResult, Severity, Vulnerability};
pub use range::parse_target_version;
pub use resolver::resolve;
pub use selector::select_candidate;
pub use source::AdvisorySource;
