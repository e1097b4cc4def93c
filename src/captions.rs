use std::sync::Arc;

use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

use crate::oauth::GoogleOAuth;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct CaptionListResponse {
    #[serde(default)]
    items: Vec<CaptionItem>,
}

#[derive(Debug, Deserialize)]
struct CaptionItem {
    id: String,
}

/// Captions via the YouTube Data API, authorized with a stored refresh token
pub struct CaptionsApi {
    client: reqwest::Client,
    oauth: Arc<GoogleOAuth>,
    refresh_token: String,
    api_base: String,
}

impl CaptionsApi {
    pub fn new(client: reqwest::Client, oauth: Arc<GoogleOAuth>, refresh_token: String) -> Self {
        Self {
            client,
            oauth,
            refresh_token,
            api_base: YOUTUBE_API_BASE.to_string(),
        }
    }

    /// Call the captions resource under `api_base` instead of the public Data API
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Plain-text captions of the first track, or `None` if the video has none
    pub async fn fetch(&self, video_id: &str) -> Result<Option<String>> {
        let token = self.oauth.refresh_access_token(&self.refresh_token).await?.access_token;

        debug!("Listing caption tracks for {video_id}");
        let resp = self
            .client
            .get(format!("{}/captions", self.api_base))
            .query(&[("part", "snippet"), ("videoId", video_id)])
            .bearer_auth(&token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("captions.list returned {status}: {body}");
        }

        let list: CaptionListResponse = resp.json().await?;
        let Some(track) = list.items.first() else {
            return Ok(None);
        };

        debug!("Downloading caption track {}", track.id);
        let resp = self
            .client
            .get(format!("{}/captions/{}", self.api_base, track.id))
            .bearer_auth(&token)
            .header("Accept", "text/plain")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("captions.download returned {status}: {body}");
        }

        Ok(Some(resp.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GoogleCredentials;
    use crate::test_support::{self, STUB_ACCESS_TOKEN, VIDEO_WITHOUT_CAPTIONS};

    fn captions_api(base: &str) -> CaptionsApi {
        let client = reqwest::Client::new();
        let oauth = GoogleOAuth::new(
            client.clone(),
            &GoogleCredentials {
                client_id: "client-123".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
                refresh_token: None,
            },
        )
        .with_token_endpoint(format!("{base}/token"));
        CaptionsApi::new(client, Arc::new(oauth), "1//stored".to_string()).with_api_base(base)
    }

    #[test]
    fn test_parse_caption_list() {
        let json = r#"{
            "kind": "youtube#captionListResponse",
            "items": [
                {"kind": "youtube#caption", "id": "AUieDaZ", "snippet": {"language": "en"}},
                {"kind": "youtube#caption", "id": "AUieDbY", "snippet": {"language": "de"}}
            ]
        }"#;
        let list: CaptionListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].id, "AUieDaZ");
    }

    #[test]
    fn test_parse_caption_list_without_items() {
        let list: CaptionListResponse = serde_json::from_str(r#"{"kind": "youtube#captionListResponse"}"#).unwrap();
        assert!(list.items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_downloads_first_track() {
        let (base, recorded) = test_support::spawn_google().await;

        let text = captions_api(&base).fetch("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(text.as_deref(), Some("captions of track-dQw4w9WgXcQ"));

        let queries = recorded.caption_queries.lock().unwrap();
        assert_eq!(queries[0]["part"], "snippet");
        assert_eq!(queries[0]["videoId"], "dQw4w9WgXcQ");

        let bearer = format!("Bearer {STUB_ACCESS_TOKEN}");
        let authorizations = recorded.authorizations.lock().unwrap();
        assert_eq!(*authorizations, vec![bearer.clone(), bearer]);

        let forms = recorded.token_forms.lock().unwrap();
        assert_eq!(forms[0]["refresh_token"], "1//stored");
    }

    #[tokio::test]
    async fn test_fetch_without_tracks() {
        let (base, recorded) = test_support::spawn_google().await;

        let text = captions_api(&base).fetch(VIDEO_WITHOUT_CAPTIONS).await.unwrap();
        assert!(text.is_none());
        assert_eq!(recorded.authorizations.lock().unwrap().len(), 1);
    }
}
