use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::CONTENT_LENGTH,
};
use serde_json::Value;

use crate::{
    error::SpotifyError,
    spotify::{ClientFactory, SpotifyApi},
    types::{PrivateUser, StartPlaybackBody, WebApiErrorResponse},
};

/// Produces [`WebApiClient`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct WebApiClientFactory {
    http: Client,
    base_url: String,
}

impl WebApiClientFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        WebApiClientFactory {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl ClientFactory for WebApiClientFactory {
    fn client(&self, access_token: &str) -> Box<dyn SpotifyApi> {
        Box::new(WebApiClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            access_token: access_token.to_string(),
        })
    }
}

/// Spotify Web API client bound to one access token.
pub struct WebApiClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl WebApiClient {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, SpotifyError> {
        let res = request.bearer_auth(&self.access_token).send().await?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            Err(SpotifyError::Unauthorized(message))
        } else {
            Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch_json(&self, request: RequestBuilder) -> Result<Value, SpotifyError> {
        let res = self.execute(request).await?;
        if res.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| SpotifyError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SpotifyApi for WebApiClient {
    async fn current_user(&self) -> Result<PrivateUser, SpotifyError> {
        let value = self.fetch_json(self.http.get(self.url("/me"))).await?;
        serde_json::from_value(value).map_err(|e| SpotifyError::Decode(e.to_string()))
    }

    async fn search(&self, query: &str, kind: &str, limit: u32) -> Result<Value, SpotifyError> {
        let request = self.http.get(self.url("/search")).query(&[
            ("q", query.to_string()),
            ("type", kind.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.fetch_json(request).await
    }

    async fn start_playback(
        &self,
        track_uri: &str,
        position_ms: u64,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError> {
        let mut request = self
            .http
            .put(self.url("/me/player/play"))
            .json(&StartPlaybackBody {
                uris: vec![track_uri.to_string()],
                position_ms,
            });
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        self.execute(request).await?;
        Ok(())
    }

    async fn pause_playback(&self, device_id: Option<&str>) -> Result<(), SpotifyError> {
        let mut request = self
            .http
            .put(self.url("/me/player/pause"))
            .header(CONTENT_LENGTH, "0");
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        self.execute(request).await?;
        Ok(())
    }

    async fn current_playback(&self) -> Result<Value, SpotifyError> {
        self.fetch_json(self.http.get(self.url("/me/player"))).await
    }

    async fn devices(&self) -> Result<Value, SpotifyError> {
        self.fetch_json(self.http.get(self.url("/me/player/devices")))
            .await
    }
}

/// Picks the most useful message out of a Web API error response.
///
/// Falls back to the status reported in the body, then to the response status.
fn error_message(status: StatusCode, body: &str) -> String {
    let Ok(WebApiErrorResponse { error }) = serde_json::from_str(body) else {
        return format!("http status: {status}");
    };
    if let Some(message) = error.message.filter(|m| !m.is_empty()) {
        return message;
    }
    let status = error
        .status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(status);
    format!("http status: {status}")
}
