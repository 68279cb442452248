use serde::{Deserialize, Serialize};

/// A video attached to a movie (trailer, teaser, clip)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String, // "YouTube" for nearly all catalog entries
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub official: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.kind == "Trailer"
    }

    /// Watch URL for YouTube-hosted videos
    pub fn watch_url(&self) -> Option<String> {
        if self.site == "YouTube" {
            Some(format!("https://www.youtube.com/watch?v={}", self.key))
        } else {
            None
        }
    }
}
