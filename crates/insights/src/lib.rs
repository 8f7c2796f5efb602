//! Bitbucket Server Code Insights client.
//!
//! This crate publishes static-analysis results to Bitbucket Server's Code
//! Insights API: a summary report per commit plus line-level annotations,
//! and removes annotations published earlier.
//!
//! # Usage
//!
//! ```no_run
//! use insights::{CreateReportRequest, InsightsClient, ReportResult, ServerConnection};
//!
//! # async fn example() -> Result<(), insights::InsightsError> {
//! let connection = ServerConnection::new("https://bitbucket.example.com", "token")?;
//! let client = InsightsClient::new(connection)?;
//!
//! if client.supports_code_insights().await {
//!     let report = CreateReportRequest::new("Analysis").with_result(ReportResult::Pass);
//!     client.create_report("PROJ", "repo", "deadbeef", &report).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ServerConnection::from_env`] reads:
//!
//! - `BITBUCKET_URL`: base URL of the Bitbucket Server instance
//! - `BITBUCKET_TOKEN`: personal access token sent as a bearer token

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod version;

pub use client::{InsightsClient, REPORT_KEY};
pub use config::{ClientOptions, ServerConnection};
pub use error::InsightsError;
pub use models::{
    Annotation, AnnotationType, CreateAnnotationsRequest, CreateReportRequest, DataValue,
    ErrorDetail, ErrorResponse, LinkValue, ReportData, ReportDataType, ReportResult,
    ServerProperties, Severity, CODE_INSIGHTS_VERSION,
};
pub use version::ServerVersion;
