//! Graph API response models

use serde::Deserialize;

/// Envelope returned by `me/music.listens`
///
/// Entries are kept as raw values so that one malformed listen does not
/// poison the whole list.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenEnvelope {
    pub data: Vec<serde_json::Value>,
}

/// One `music.listens` action
#[derive(Debug, Clone, Deserialize)]
pub struct ListenEntry {
    pub data: ListenData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenData {
    pub song: SongRef,
}

/// The song a listen points at
#[derive(Debug, Clone, Deserialize)]
pub struct SongRef {
    pub id: String,
    pub url: String,
    pub title: String,
}

/// Open Graph song object returned by `GET <id>`
#[derive(Debug, Clone, Deserialize)]
pub struct SongObject {
    #[serde(default)]
    pub image: Vec<MediaLink>,
    pub description: String,
    pub site_name: String,
    pub data: SongObjectData,
    #[serde(default)]
    pub audio: Vec<MediaLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongObjectData {
    #[serde(default)]
    pub musician: Vec<Musician>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Musician {
    pub name: String,
}

/// `{ "url": ... }` entries used for both images and audio
#[derive(Debug, Clone, Deserialize)]
pub struct MediaLink {
    pub url: String,
}

/// Profile returned by `me?fields=name,picture`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
    pub picture: Option<Picture>,
}

/// The picture field changed shape across API versions, accept both
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Picture {
    /// `"picture": { "data": { "url": ... } }`
    Nested { data: MediaLink },
    /// `"picture": "https://..."`
    Plain(String),
}

impl Picture {
    pub fn url(&self) -> &str {
        match self {
            Picture::Nested { data } => &data.url,
            Picture::Plain(url) => url,
        }
    }
}

/// User name and picture URL
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub picture_url: Option<String>,
}

impl From<ProfileResponse> for Profile {
    fn from(response: ProfileResponse) -> Self {
        Self {
            picture_url: response.picture.map(|p| p.url().to_string()),
            name: response.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_nested_shape() {
        let json = r#"{"name":"Ada","picture":{"data":{"url":"http://pic/ada.jpg"}}}"#;
        let profile: Profile = serde_json::from_str::<ProfileResponse>(json).unwrap().into();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.picture_url.as_deref(), Some("http://pic/ada.jpg"));
    }

    #[test]
    fn test_picture_plain_shape() {
        let json = r#"{"name":"Ada","picture":"http://pic/ada.jpg"}"#;
        let profile: Profile = serde_json::from_str::<ProfileResponse>(json).unwrap().into();
        assert_eq!(profile.picture_url.as_deref(), Some("http://pic/ada.jpg"));
    }

    #[test]
    fn test_picture_missing() {
        let profile: Profile = serde_json::from_str::<ProfileResponse>(r#"{"name":"Ada"}"#)
            .unwrap()
            .into();
        assert!(profile.picture_url.is_none());
    }

    #[test]
    fn test_song_object_defaults_empty_arrays() {
        let json = r#"{"description":"d","site_name":"s","data":{}}"#;
        let song: SongObject = serde_json::from_str(json).unwrap();
        assert!(song.image.is_empty());
        assert!(song.audio.is_empty());
        assert!(song.data.musician.is_empty());
    }
}
