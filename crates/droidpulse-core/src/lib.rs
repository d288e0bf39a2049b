pub mod ai;
pub mod config;
pub mod digest;
pub mod error;
pub mod feed;
pub mod notify;
pub mod storage;

pub use config::AppConfig;
pub use digest::{Digest, FreshItems, RunOutcome};
pub use error::{Error, Result};
