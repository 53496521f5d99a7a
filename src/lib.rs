pub mod config;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod output;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use matcher::AdvisoryMatcher;
pub use model::{Advisory, CheckReport, DetectedVulnerability, Ecosystem};
pub use store::{AdvisoryStore, MemoryStore, StoreError};
