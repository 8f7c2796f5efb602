//! Bitbucket Server Code Insights request and response models.
//!
//! Field names follow the server's camelCase JSON schema. Optional fields
//! are left out of serialized payloads entirely rather than sent as `null`,
//! and unknown response fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::version::ServerVersion;

/// Oldest Bitbucket Server release that ships the Code Insights API.
pub const CODE_INSIGHTS_VERSION: &str = "5.15";

// ============================================================================
// Server properties
// ============================================================================

/// Response of `GET /rest/api/1.0/application-properties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProperties {
    /// Server version, e.g. "7.21.0".
    pub version: String,
    /// Build number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    /// Build date (epoch millis as reported by the server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    /// Product name, usually "Bitbucket".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ServerProperties {
    /// Whether this server is recent enough to accept Code Insights reports.
    ///
    /// An unparsable version is treated as unsupported.
    #[must_use]
    pub fn has_code_insights_api(&self) -> bool {
        let minimum = ServerVersion::minimum_code_insights();
        match self.version.parse::<ServerVersion>() {
            Ok(version) => version >= minimum,
            Err(e) => {
                warn!(version = %self.version, error = %e, "Unrecognised Bitbucket version");
                false
            }
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Overall outcome shown on the report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportResult {
    /// Quality gate passed.
    Pass,
    /// Quality gate failed.
    Fail,
}

/// Report attached to a commit under this integration's report key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// Report title shown in the pull request sidebar.
    pub title: String,
    /// Free-text summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Pass/fail outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ReportResult>,
    /// Name of the tool that produced the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    /// Link to the full analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Logo displayed next to the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Creation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<i64>,
    /// Key/value metrics, at most six are rendered by the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ReportData>,
}

impl CreateReportRequest {
    /// Create a report with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the pass/fail outcome.
    #[must_use]
    pub fn with_result(mut self, result: ReportResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Append a data item.
    #[must_use]
    pub fn with_data(mut self, data: ReportData) -> Self {
        self.data.push(data);
        self
    }
}

/// Kind of a report data value, used by the server for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportDataType {
    Boolean,
    Date,
    Duration,
    Link,
    Number,
    Percentage,
    Text,
}

/// Hyperlink value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkValue {
    pub linktext: String,
    pub href: String,
}

/// Value of a report data item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Link(LinkValue),
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

/// Single metric on a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub title: String,
    pub value: DataValue,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<ReportDataType>,
}

impl ReportData {
    #[must_use]
    pub fn text(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: DataValue::Text(value.into()),
            data_type: Some(ReportDataType::Text),
        }
    }

    #[must_use]
    pub fn number(title: impl Into<String>, value: i64) -> Self {
        Self {
            title: title.into(),
            value: DataValue::Integer(value),
            data_type: Some(ReportDataType::Number),
        }
    }

    /// Percentage in the 0-100 range.
    #[must_use]
    pub fn percentage(title: impl Into<String>, value: f64) -> Self {
        Self {
            title: title.into(),
            value: DataValue::Decimal(value),
            data_type: Some(ReportDataType::Percentage),
        }
    }

    #[must_use]
    pub fn link(
        title: impl Into<String>,
        linktext: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            value: DataValue::Link(LinkValue {
                linktext: linktext.into(),
                href: href.into(),
            }),
            data_type: Some(ReportDataType::Link),
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Annotation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationType {
    Vulnerability,
    CodeSmell,
    Bug,
}

/// Line-level finding attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Caller-side identifier, lets the server deduplicate findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// 1-based line; 0 annotates the file as a whole.
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub message: String,
    /// Repository-relative file path.
    pub path: String,
    pub severity: Severity,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<AnnotationType>,
}

/// Body of `POST .../reports/{key}/annotations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAnnotationsRequest {
    pub annotations: Vec<Annotation>,
}

impl CreateAnnotationsRequest {
    #[must_use]
    pub fn new(annotations: Vec<Annotation>) -> Self {
        Self { annotations }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }
}

impl FromIterator<Annotation> for CreateAnnotationsRequest {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error document returned with non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// Individual error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Field or parameter the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Server-side exception class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_name: Option<String>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{context}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
