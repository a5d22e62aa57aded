//! REST API client.
//!
//! Fetches the session (and its chat snapshot) once at start-up and checks
//! that the backend is reachable. Requests authenticate with the user's API
//! token; there is no retry and no cancellation.

use oilandrope_proto::{Session, SessionId};
use reqwest::{
    Client as HttpClient, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use thiserror::Error;

/// Oldest Django REST framework release the client understands.
pub const MIN_DRF_VERSION: (u32, u32) = (3, 12);

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed or the body could not be decoded.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Requested URL.
        url: String,
    },

    /// The backend runs an unsupported REST framework version.
    #[error("unsupported REST framework version {version:?}")]
    Version {
        /// Reported version string.
        version: String,
    },
}

#[derive(Deserialize)]
struct ApiRoot {
    #[serde(default)]
    drf_version: Option<String>,
}

/// HTTP client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    origin: String,
    token: String,
}

impl ApiClient {
    /// Create a client for the API at `origin` (e.g. `http://localhost:8000`).
    pub fn new(origin: impl Into<String>, token: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self { http: HttpClient::new(), origin, token: token.into() }
    }

    /// URL of the session detail endpoint.
    pub fn session_detail_url(&self, session: &SessionId) -> String {
        format!("{}/api/roleplay/session/{}/", self.origin, session)
    }

    /// Fetch a session with its chat and message snapshot.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] on a non-2xx answer, [`ApiError::Http`] on
    /// transport or decoding failures.
    pub async fn fetch_session(&self, session: &SessionId) -> Result<Session, ApiError> {
        let url = self.session_detail_url(session);
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url });
        }

        Ok(response.json::<Session>().await?)
    }

    /// Check that the API root answers and reports a supported version.
    ///
    /// Returns the reported REST framework version.
    ///
    /// # Errors
    ///
    /// [`ApiError::Version`] when the version is missing, unparseable or
    /// older than [`MIN_DRF_VERSION`]; otherwise as [`Self::fetch_session`].
    pub async fn check_health(&self) -> Result<String, ApiError> {
        let url = format!("{}/api/", self.origin);
        let response = self.http.get(&url).header(ACCEPT, "application/json").send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status { status, url });
        }

        let root = response.json::<ApiRoot>().await?;
        let version = root.drf_version.unwrap_or_default();

        match parse_version(&version) {
            Some(parsed) if parsed >= MIN_DRF_VERSION => Ok(version),
            _ => Err(ApiError::Version { version }),
        }
    }
}

/// Parse the `major.minor` prefix of a version string.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    Some((major, minor))
}
