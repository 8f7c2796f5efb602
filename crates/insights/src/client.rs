//! Bitbucket Server Code Insights API client.
//!
//! API Documentation:
//! <https://developer.atlassian.com/server/bitbucket/how-tos/code-insights/>

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::config::{ClientOptions, ServerConnection};
use crate::error::InsightsError;
use crate::models::{
    CreateAnnotationsRequest, CreateReportRequest, ServerProperties, CODE_INSIGHTS_VERSION,
};

/// Key identifying reports published by this integration.
pub const REPORT_KEY: &str = "com.github.mc1arke.sonarqube";

const APPLICATION_JSON: &str = "application/json";

/// Client for one Bitbucket Server instance.
///
/// The HTTP transport is built once in the constructor and shared by every
/// call. A client is bound to the [`ServerConnection`] it was created with;
/// use a separate client for another server or token.
#[derive(Debug, Clone)]
pub struct InsightsClient {
    /// HTTP client.
    client: Client,
    /// Server URL and token.
    connection: ServerConnection,
}

impl InsightsClient {
    /// Create a client with default transport options.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(connection: ServerConnection) -> Result<Self, InsightsError> {
        Self::with_options(connection, ClientOptions::default())
    }

    /// Create a client with explicit transport options.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn with_options(
        connection: ServerConnection,
        options: ClientOptions,
    ) -> Result<Self, InsightsError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self { client, connection })
    }

    /// Connection this client is bound to.
    #[must_use]
    pub fn connection(&self) -> &ServerConnection {
        &self.connection
    }

    /// Fetch the server's application properties.
    ///
    /// # Errors
    /// Fails on transport errors, non-success statuses, an empty body
    /// ([`InsightsError::MissingBody`]) or an unparsable body.
    pub async fn get_server_properties(&self) -> Result<ServerProperties, InsightsError> {
        let url = format!("{}/rest/api/1.0/application-properties", self.connection.url());
        let response = self.dispatch(Method::GET, &url, None).await?;
        let body = response.text().await?;
        codec::decode(&body)
    }

    /// Whether the server supports the Code Insights API.
    ///
    /// Any failure while querying the server is logged and reported as
    /// `false`.
    pub async fn supports_code_insights(&self) -> bool {
        let server = match self.get_server_properties().await {
            Ok(server) => server,
            Err(e) => {
                error!(error = %e, "Could not determine Bitbucket Server version");
                return false;
            }
        };

        debug!(version = %server.version, "Bitbucket Server version detected");
        if server.has_code_insights_api() {
            return true;
        }

        info!(
            version = %server.version,
            minimum = CODE_INSIGHTS_VERSION,
            "Bitbucket Server version is too old for Code Insights"
        );
        false
    }

    /// Create or replace this integration's report on a commit.
    ///
    /// # Errors
    /// Fails on transport errors or non-success statuses.
    pub async fn create_report(
        &self,
        project: &str,
        repository: &str,
        commit: &str,
        report: &CreateReportRequest,
    ) -> Result<(), InsightsError> {
        let body = codec::encode(report)?;
        let url = self.report_url(project, repository, commit);
        self.dispatch(Method::PUT, &url, Some(body)).await?;

        info!(project, repository, commit, "Code Insights report published");
        Ok(())
    }

    /// Add annotations to this integration's report on a commit.
    ///
    /// An empty set returns immediately without contacting the server.
    ///
    /// # Errors
    /// Fails on transport errors or non-success statuses.
    pub async fn create_annotations(
        &self,
        project: &str,
        repository: &str,
        commit: &str,
        annotations: &CreateAnnotationsRequest,
    ) -> Result<(), InsightsError> {
        if annotations.is_empty() {
            debug!(commit, "No annotations to publish");
            return Ok(());
        }

        let body = codec::encode(annotations)?;
        let url = self.annotations_url(project, repository, commit);
        self.dispatch(Method::POST, &url, Some(body)).await?;

        info!(
            project,
            repository,
            commit,
            count = annotations.len(),
            "Code Insights annotations published"
        );
        Ok(())
    }

    /// Remove every annotation on this integration's report for a commit.
    ///
    /// # Errors
    /// Fails on transport errors or non-success statuses.
    pub async fn delete_annotations(
        &self,
        project: &str,
        repository: &str,
        commit: &str,
    ) -> Result<(), InsightsError> {
        let url = self.annotations_url(project, repository, commit);
        self.dispatch(Method::DELETE, &url, None).await?;

        info!(project, repository, commit, "Code Insights annotations deleted");
        Ok(())
    }

    fn report_url(&self, project: &str, repository: &str, commit: &str) -> String {
        format!(
            "{}/rest/insights/1.0/projects/{project}/repos/{repository}/commits/{commit}/reports/{REPORT_KEY}",
            self.connection.url()
        )
    }

    fn annotations_url(&self, project: &str, repository: &str, commit: &str) -> String {
        format!("{}/annotations", self.report_url(project, repository, commit))
    }

    /// Send an authenticated request and validate the response.
    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<Response, InsightsError> {
        debug!(method = %method, url = %url, "Bitbucket request");

        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.connection.token()));
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, APPLICATION_JSON).body(body);
        }

        let response = request.send().await?;
        Self::validate(response).await
    }

    /// Pass success responses through; turn anything else into
    /// [`InsightsError::Rejected`].
    async fn validate(response: Response) -> Result<Response, InsightsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %text, "Bitbucket request rejected");

        Err(InsightsError::Rejected {
            status: status.as_u16(),
            body: codec::decode_error_body(&text),
        })
    }
}
