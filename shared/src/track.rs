use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::colors::{ColorName, assign_track_colors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl TrackId {
    /// Read a track id back from a DOM attribute. Anything but an integer is `None`.
    pub fn parse_attr(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

/// Human-readable description of a track, as published with the dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackMeta {
    #[serde(default)]
    pub post_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_title: Option<String>,
}

impl TrackMeta {
    pub fn post_url(&self) -> Option<&str> {
        non_empty(self.post_url.as_deref())
    }

    pub fn track_title(&self) -> Option<&str> {
        non_empty(self.track_title.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default)]
    pub meta: TrackMeta,
    /// Display color, assigned once when the catalog is built.
    #[serde(skip)]
    pub color: Option<ColorName>,
}

impl Track {
    pub fn new(id: TrackId, post_title: impl Into<String>) -> Self {
        Self {
            id,
            meta: TrackMeta {
                post_title: post_title.into(),
                ..TrackMeta::default()
            },
            color: None,
        }
    }
}

/// Dataset metadata: the ordered track list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracks: Vec<Track>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Track>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Track>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Label shown next to a track checkbox: `prefix` then `text`. When `link` is set
/// only `text` is rendered as the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLabel {
    pub id: TrackId,
    pub prefix: String,
    pub text: String,
    pub link: Option<String>,
}

impl fmt::Display for TrackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.text)
    }
}

/// Loaded tracks with their colors. Fixed for the lifetime of the dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
}

impl TrackCatalog {
    pub fn new(mut tracks: Vec<Track>, palette: &[ColorName]) -> Self {
        assign_track_colors(&mut tracks, palette);
        Self { tracks }
    }

    pub fn from_meta(meta: Meta, palette: &[ColorName]) -> Self {
        Self::new(meta.tracks, palette)
    }

    /// First loaded track with the given id.
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn color_of(&self, id: TrackId) -> Option<ColorName> {
        self.get(id).and_then(|t| t.color)
    }

    pub fn label(&self, id: TrackId) -> TrackLabel {
        let Some(track) = self.get(id) else {
            return TrackLabel {
                id,
                prefix: String::new(),
                text: format!("track: {id}"),
                link: None,
            };
        };

        let mut text = track.meta.post_title.clone();
        if let Some(title) = track.meta.track_title() {
            text.push_str(&format!(" ({title})"));
        }
        TrackLabel {
            id,
            prefix: format!("{id}: "),
            text,
            link: track.meta.post_url().map(str::to_owned),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
