use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GoogleCredentials;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Tokens returned by Google's token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Google OAuth client for the YouTube scope
pub struct GoogleOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_endpoint: String,
}

impl GoogleOAuth {
    pub fn new(client: reqwest::Client, credentials: &GoogleCredentials) -> Self {
        Self {
            client,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_uri: credentials.redirect_uri.clone(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }

    /// Send token requests to `endpoint` instead of Google's
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Consent page URL requesting offline access (so a refresh token is issued)
    pub fn authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", YOUTUBE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair> {
        debug!("Exchanging authorization code");
        self.request_tokens(&[
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Obtain a fresh access token from a long-lived refresh token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair> {
        debug!("Refreshing access token");
        let mut tokens = self
            .request_tokens(&[
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        tokens.refresh_token.get_or_insert_with(|| refresh_token.to_string());
        Ok(tokens)
    }

    async fn request_tokens(&self, params: &[(&str, &str)]) -> Result<TokenPair> {
        let resp = self.client.post(&self.token_endpoint).form(params).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("token endpoint returned {status}: {body}");
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, REJECTED_CODE, STUB_ACCESS_TOKEN, STUB_REFRESH_TOKEN};

    fn oauth() -> GoogleOAuth {
        GoogleOAuth::new(
            reqwest::Client::new(),
            &GoogleCredentials {
                client_id: "client-123".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
                refresh_token: None,
            },
        )
    }

    #[test]
    fn test_authorization_url() {
        let url = Url::parse(&oauth().authorization_url().unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:3000/api/auth/callback"));
        assert_eq!(get("scope"), Some(YOUTUBE_SCOPE));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("response_type"), Some("code"));
    }

    #[test]
    fn test_token_pair_without_refresh_token() {
        let json = r#"{"access_token": "ya29.abc", "expires_in": 3599, "token_type": "Bearer"}"#;
        let tokens: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "ya29.abc");
        assert_eq!(tokens.expires_in, Some(3599));
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_exchange_code_sends_authorization_code_grant() {
        let (base, recorded) = test_support::spawn_google().await;
        let oauth = oauth().with_token_endpoint(format!("{base}/token"));

        let tokens = oauth.exchange_code("4/0Abc").await.unwrap();
        assert_eq!(tokens.access_token, STUB_ACCESS_TOKEN);
        assert_eq!(tokens.refresh_token.as_deref(), Some(STUB_REFRESH_TOKEN));
        assert_eq!(tokens.expires_in, Some(3599));

        let forms = recorded.token_forms.lock().unwrap();
        assert_eq!(forms.len(), 1);
        let form = &forms[0];
        assert_eq!(form["grant_type"], "authorization_code");
        assert_eq!(form["code"], "4/0Abc");
        assert_eq!(form["client_id"], "client-123");
        assert_eq!(form["client_secret"], "secret");
        assert_eq!(form["redirect_uri"], "http://localhost:3000/api/auth/callback");
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let (base, recorded) = test_support::spawn_google().await;
        let oauth = oauth().with_token_endpoint(format!("{base}/token"));

        let tokens = oauth.refresh_access_token("1//long-lived").await.unwrap();
        assert_eq!(tokens.access_token, STUB_ACCESS_TOKEN);
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//long-lived"));

        let forms = recorded.token_forms.lock().unwrap();
        assert_eq!(forms[0]["grant_type"], "refresh_token");
        assert_eq!(forms[0]["refresh_token"], "1//long-lived");
        assert!(!forms[0].contains_key("code"));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let (base, _) = test_support::spawn_google().await;
        let oauth = oauth().with_token_endpoint(format!("{base}/token"));

        let err = oauth.exchange_code(REJECTED_CODE).await.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("invalid_grant"));
    }
}
