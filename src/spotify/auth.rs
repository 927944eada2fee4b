use reqwest::{Client, header::AUTHORIZATION};
use url::Url;

use crate::{
    config::SpotifyConfig,
    error::OAuthError,
    types::{TokenCredential, TokenEndpointError, TokenEndpointResponse},
    utils,
};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 3600;

struct Credentials<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

/// Stateless client of the Spotify accounts service.
///
/// Holds the application credentials and nothing else. Tokens obtained through
/// it are returned to the caller and never cached.
#[derive(Debug, Clone)]
pub struct OAuthGateway {
    config: SpotifyConfig,
    http: Client,
}

impl OAuthGateway {
    pub fn new(config: SpotifyConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: SpotifyConfig, http: Client) -> Self {
        OAuthGateway { config, http }
    }

    /// Builds the authorization URL the browser should be sent to.
    ///
    /// The URL carries `client_id`, `response_type=code`, `redirect_uri` and
    /// the space-separated scope list. Nothing is sent over the network.
    ///
    /// # Errors
    ///
    /// [`OAuthError::Configuration`] when a credential is missing or the
    /// configured authorization endpoint is not a valid URL.
    pub fn begin_login(&self) -> Result<String, OAuthError> {
        let creds = self.credentials()?;
        let scope = utils::scope_string();

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", creds.client_id),
                ("response_type", "code"),
                ("redirect_uri", creds.redirect_uri),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| {
            OAuthError::Configuration(format!(
                "invalid authorization endpoint '{}': {e}",
                self.config.auth_url
            ))
        })?;

        Ok(url.into())
    }

    /// Exchanges an authorization code for a token credential.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::Configuration`] when credentials are missing
    /// - [`OAuthError::Exchange`] when the code is invalid, expired or was
    ///   issued for another redirect URI
    /// - [`OAuthError::Http`] on network failures or malformed responses
    pub async fn complete_login(&self, code: &str) -> Result<TokenCredential, OAuthError> {
        let creds = self.credentials()?;
        let token = self
            .request_token(
                &creds,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", creds.redirect_uri),
                ],
            )
            .await?;

        tracing::info!(scope = token.scope.as_deref().unwrap_or(""), "obtained access token");

        Ok(TokenCredential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        })
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// Spotify may or may not rotate the refresh token. When the response
    /// carries none, the credential keeps `refresh_token` so the caller can go
    /// on using it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenCredential, OAuthError> {
        let creds = self.credentials()?;
        let token = self
            .request_token(
                &creds,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;

        let rotated = token.refresh_token.is_some();
        tracing::debug!(rotated, "refreshed access token");

        Ok(TokenCredential {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expires_in: token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        })
    }

    async fn request_token(
        &self,
        creds: &Credentials<'_>,
        form: &[(&str, &str)],
    ) -> Result<TokenEndpointResponse, OAuthError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_credentials(creds.client_id, creds.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenEndpointError>(&body) {
                Ok(TokenEndpointError {
                    error,
                    error_description: Some(description),
                }) => format!("{error}: {description}"),
                Ok(TokenEndpointError { error, .. }) => error,
                Err(_) => format!("token endpoint answered {status}"),
            };
            tracing::warn!(status = status.as_u16(), %message, "token request rejected");
            return Err(OAuthError::Exchange(message));
        }

        Ok(res.json::<TokenEndpointResponse>().await?)
    }

    fn credentials(&self) -> Result<Credentials<'_>, OAuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or_else(|| OAuthError::Configuration("SPOTIFY_CLIENT_ID is not set".into()))?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or_else(|| OAuthError::Configuration("SPOTIFY_CLIENT_SECRET is not set".into()))?;
        let redirect_uri = self
            .config
            .redirect_uri
            .as_deref()
            .ok_or_else(|| OAuthError::Configuration("REDIRECT_URI is not set".into()))?;

        Ok(Credentials {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}
