use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::track::TrackId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    Other,
}

/// Geometry of a feature. Coordinates are passed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self.type_name.as_deref() {
            Some("Point") => GeometryKind::Point,
            Some("LineString") => GeometryKind::LineString,
            _ => GeometryKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `None` when absent or not an array of integers.
    #[serde(
        default,
        deserialize_with = "track_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub tracks: Option<Vec<TrackId>>,
    /// Only a literal `true` marks a crossing.
    #[serde(default, deserialize_with = "strict_true")]
    pub crossing: bool,
}

/// A geojson feature. Every field is optional so that one malformed record never
/// fails the whole collection; such records simply never match a track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<FeatureProperties>,
}

impl Feature {
    pub fn is_well_formed(&self) -> bool {
        self.type_name.as_deref() == Some("Feature")
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        self.geometry
            .as_ref()
            .map(Geometry::kind)
            .unwrap_or(GeometryKind::Other)
    }

    pub fn geometry_type(&self) -> Option<&str> {
        self.geometry.as_ref()?.type_name.as_deref()
    }

    /// Track memberships in listed order, `None` if missing or invalid.
    pub fn track_list(&self) -> Option<&[TrackId]> {
        self.properties.as_ref()?.tracks.as_deref()
    }

    pub fn is_crossing(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| p.crossing)
    }

    /// Feature id for display: strings verbatim, anything else as JSON.
    pub fn display_id(&self) -> Option<String> {
        match self.properties.as_ref()?.id.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub type_name: String,
    #[serde(default, deserialize_with = "feature_list")]
    pub features: Vec<Feature>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_owned()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

fn track_list<'de, D>(deserializer: D) -> Result<Option<Vec<TrackId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(items
        .iter()
        .map(|item| item.as_i64().map(TrackId))
        .collect())
}

fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(
        Option::<Value>::deserialize(deserializer)?,
        Some(Value::Bool(true))
    ))
}

// Entries that are not even objects are kept as empty features so indices still
// line up with the source collection.
fn feature_list<'de, D>(deserializer: D) -> Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}
