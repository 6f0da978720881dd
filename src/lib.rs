pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod provider;
pub mod ui;

pub use auth::AuthStrategy;
pub use config::ProviderConfig;
pub use domain::{Commit, Release, RepositoryInfo};
pub use error::{ProviderError, Result};
pub use provider::{ReleaseRepository, ReleaseRequest};
