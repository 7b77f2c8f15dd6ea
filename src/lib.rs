pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;
pub use crate::config::LeadConfig;

pub use crate::core::{client::HttpLeadGateway, flow::SubmissionFlow, timer::ResendTimer};
pub use crate::utils::error::{ApiError, LeadError, Result, ValidationError};
