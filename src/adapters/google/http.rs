//! Shared HTTP plumbing for the Google REST clients

use crate::config::{GoogleConfig, SecretString};
use crate::domain::{ExamGenError, RemoteError, Result};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Authenticated HTTP client bound to one API base URL
#[derive(Clone)]
pub struct GoogleHttp {
    client: Client,
    base_url: Url,
    token: SecretString,
}

impl GoogleHttp {
    /// Builds a client for `base_url` using the token and timeout from `config`
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an unparseable base URL or if the
    /// TLS backend cannot be initialised
    pub fn new(config: &GoogleConfig, base_url: &str) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExamGenError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ExamGenError::Configuration(format!("Invalid API base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            token: config.access_token.clone(),
        })
    }

    /// URL made of the base path followed by `segments`, each percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ExamGenError::Configuration(format!(
                    "API base URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.get(url))
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.post(url))
    }

    pub fn patch(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.patch(url))
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.authorized(self.client.delete(url))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.expose_secret().as_ref())
    }

    /// Sends a request and maps transport and status failures to [`RemoteError`]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ExamGenError::Remote(status_error(status, body)))
    }

    /// Sends a request and decodes its JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ExamGenError::Remote(RemoteError::InvalidResponse(e.to_string())))
    }
}

/// Maps a non-success status to the remote error taxonomy
pub fn status_error(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited(body),
        s if s.is_server_error() => RemoteError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        s => RemoteError::ClientError {
            status: s.as_u16(),
            message: body,
        },
    }
}

fn transport_error(err: reqwest::Error) -> ExamGenError {
    if err.is_timeout() {
        ExamGenError::Remote(RemoteError::Timeout(err.to_string()))
    } else {
        ExamGenError::Remote(RemoteError::ConnectionFailed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use test_case::test_case;

    fn config() -> GoogleConfig {
        GoogleConfig {
            access_token: secret_string("token".to_string()),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            timeout_seconds: 5,
            batch_concurrency: 4,
        }
    }

    #[test_case(404, "NotFound")]
    #[test_case(429, "RateLimited")]
    #[test_case(503, "ServerError")]
    #[test_case(403, "ClientError")]
    #[test_case(400, "ClientError")]
    fn test_status_error_mapping(code: u16, expected: &str) {
        let err = status_error(StatusCode::from_u16(code).unwrap(), "body".to_string());
        assert!(format!("{err:?}").starts_with(expected));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let http = GoogleHttp::new(&config(), "https://sheets.googleapis.com/v4/").unwrap();
        let url = http
            .endpoint(&["spreadsheets", "abc", "values", "Sheet 1!A1:K10"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Sheet%201!A1:K10"
        );
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(GoogleHttp::new(&config(), "not a url").is_err());
    }
}
