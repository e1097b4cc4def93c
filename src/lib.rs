pub mod captions;
pub mod config;
pub mod error;
pub mod llm;
pub mod oauth;
pub mod output;
pub mod server;
pub mod summarize;
pub mod youtube;

#[cfg(test)]
mod test_support;

use serde::Serialize;
use url::Url;

const WATCH_HOST: &str = "youtube.com";
const SHORT_LINK_HOST: &str = "youtu.be";

/// A single timed transcript fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

/// Complete transcript for a video
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Fragment texts joined by single spaces, in original order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Summary of a video, as returned by `/api/transcript` and `ytbrief summarize --format json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub transcript: String,
}

/// Extract the video ID from a YouTube watch URL or a youtu.be short link
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;

    let id = if host.contains(WATCH_HOST) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else if host == SHORT_LINK_HOST {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string)
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}
