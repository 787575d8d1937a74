use crate::colors::{CROSSING_COLOR, ColorName, HIGHLIGHT_COLOR, NEUTRAL_COLOR};
use crate::feature::{Feature, GeometryKind};
use crate::track::{TrackCatalog, TrackId};

pub const POINT_RADIUS: f64 = 5.0;
pub const CROSSING_RADIUS: f64 = 10.0;

/// Per-feature style overrides. `None` fields keep the renderer's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathStyle {
    pub color: Option<ColorName>,
    pub fill_color: Option<ColorName>,
    pub radius: Option<f64>,
}

impl PathStyle {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Base options for the circle marker created for every point feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerOptions {
    pub radius: f64,
    pub fill_color: ColorName,
    pub color: ColorName,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

pub const POINT_MARKER: MarkerOptions = MarkerOptions {
    radius: POINT_RADIUS,
    fill_color: "#fff969",
    color: "#cfc939",
    weight: 1.0,
    opacity: 1.0,
    fill_opacity: 0.8,
};

impl MarkerOptions {
    /// Marker options with the style's overrides applied.
    pub fn with_style(self, style: &PathStyle) -> Self {
        Self {
            radius: style.radius.unwrap_or(self.radius),
            fill_color: style.fill_color.unwrap_or(self.fill_color),
            color: style.color.unwrap_or(self.color),
            ..self
        }
    }
}

/// Color of a feature under the default style: the color of its first listed track.
/// With track coloring off every feature gets the neutral color.
pub fn track_color(
    tracks: Option<&[TrackId]>,
    catalog: &TrackCatalog,
    use_track_colors: bool,
) -> Option<ColorName> {
    if !use_track_colors {
        return Some(NEUTRAL_COLOR);
    }
    let first = tracks?.first()?;
    catalog.color_of(*first)
}

pub fn default_style(feature: &Feature, catalog: &TrackCatalog, use_track_colors: bool) -> PathStyle {
    let color = || track_color(feature.track_list(), catalog, use_track_colors);
    match feature.geometry_kind() {
        GeometryKind::LineString => PathStyle {
            color: color(),
            ..PathStyle::default()
        },
        GeometryKind::Point if feature.is_crossing() => PathStyle {
            fill_color: Some(CROSSING_COLOR),
            radius: Some(CROSSING_RADIUS),
            ..PathStyle::default()
        },
        GeometryKind::Point => PathStyle {
            fill_color: color(),
            radius: Some(POINT_RADIUS),
            ..PathStyle::default()
        },
        GeometryKind::Other => PathStyle::default(),
    }
}

/// Style of a highlight layer. Track colors are ignored: every feature on such a
/// layer already belongs to the highlighted track.
pub fn highlighted_style(feature: &Feature) -> PathStyle {
    match feature.geometry_kind() {
        GeometryKind::LineString => PathStyle {
            color: Some(HIGHLIGHT_COLOR),
            ..PathStyle::default()
        },
        GeometryKind::Point => PathStyle {
            fill_color: Some(HIGHLIGHT_COLOR),
            radius: Some(if feature.is_crossing() {
                CROSSING_RADIUS
            } else {
                POINT_RADIUS
            }),
            ..PathStyle::default()
        },
        GeometryKind::Other => PathStyle::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    fn feature(json: &str) -> Feature {
        serde_json::from_str(json).expect("parse feature")
    }

    fn catalog() -> TrackCatalog {
        // track 2 loads first (Green), track 1 second (Blue)
        TrackCatalog::new(
            vec![Track::new(TrackId(2), "two"), Track::new(TrackId(1), "one")],
            &["Green", "Blue"],
        )
    }

    #[test]
    fn first_listed_track_wins() {
        let line = feature(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"tracks":[2,1]}}"#,
        );
        assert_eq!(default_style(&line, &catalog(), true).color, Some("Green"));

        let reversed = feature(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"tracks":[1,2]}}"#,
        );
        assert_eq!(default_style(&reversed, &catalog(), true).color, Some("Blue"));
    }

    #[test]
    fn neutral_color_when_track_coloring_disabled() {
        let point = feature(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"tracks":[2]}}"#,
        );
        let style = default_style(&point, &catalog(), false);
        assert_eq!(style.fill_color, Some(NEUTRAL_COLOR));
        assert_eq!(style.radius, Some(POINT_RADIUS));
    }

    #[test]
    fn untracked_features_leave_color_to_the_renderer() {
        let line = feature(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"tracks":[]}}"#,
        );
        assert_eq!(default_style(&line, &catalog(), true).color, None);

        let unknown = feature(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"tracks":[77]}}"#,
        );
        assert_eq!(default_style(&unknown, &catalog(), true).color, None);
    }

    #[test]
    fn crossing_points_are_enlarged_in_both_variants() {
        let crossing = feature(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"tracks":[2],"crossing":true}}"#,
        );

        let base = default_style(&crossing, &catalog(), true);
        assert_eq!(base.fill_color, Some(CROSSING_COLOR));
        assert_eq!(base.radius, Some(CROSSING_RADIUS));

        let highlighted = highlighted_style(&crossing);
        assert_eq!(highlighted.fill_color, Some(HIGHLIGHT_COLOR));
        assert_eq!(highlighted.radius, Some(CROSSING_RADIUS));
    }

    #[test]
    fn highlighted_style_ignores_track_colors() {
        let line = feature(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{"tracks":[2]}}"#,
        );
        assert_eq!(highlighted_style(&line).color, Some(HIGHLIGHT_COLOR));

        let point = feature(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"tracks":[2]}}"#,
        );
        assert_eq!(highlighted_style(&point).radius, Some(POINT_RADIUS));
    }

    #[test]
    fn other_geometries_get_an_empty_style() {
        let polygon = feature(
            r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[]},"properties":{"tracks":[2]}}"#,
        );
        assert!(default_style(&polygon, &catalog(), true).is_empty());
        assert!(highlighted_style(&polygon).is_empty());
    }

    #[test]
    fn marker_defaults_are_overridden_field_by_field() {
        let marker = POINT_MARKER.with_style(&PathStyle {
            fill_color: Some("blue"),
            radius: Some(CROSSING_RADIUS),
            ..PathStyle::default()
        });
        assert_eq!(marker.fill_color, "blue");
        assert_eq!(marker.radius, CROSSING_RADIUS);
        assert_eq!(marker.color, POINT_MARKER.color);
        assert_eq!(marker.fill_opacity, POINT_MARKER.fill_opacity);
    }
}
