use std::f64::consts::PI;

use serde_json::Value;

/// Side of the projected world square at zoom 0, in world units.
pub const WORLD_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Web Mercator: `[lon, lat]` in degrees to world units, y growing south.
pub fn project(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = lat.to_radians().sin();
    let x = (lon + 180.0) / 360.0 * WORLD_SIZE;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * WORLD_SIZE;
    (x, y)
}

/// A geojson position (`[lon, lat, ...]`) projected to world units.
pub fn project_position(value: &Value) -> Option<(f64, f64)> {
    let coords = value.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    Some(project(lon, lat))
}

/// A list of positions. Entries that are not positions are skipped.
pub fn project_line(value: &Value) -> Vec<(f64, f64)> {
    value
        .as_array()
        .map(|positions| positions.iter().filter_map(project_position).collect())
        .unwrap_or_default()
}

/// Axis-aligned box in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_point((x, y): (f64, f64)) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, point| {
            let point = Self::from_point(point);
            Some(acc.map_or(point, |bounds| bounds.union(&point)))
        })
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = project(0.0, 0.0);
        assert!(close(x, WORLD_SIZE / 2.0));
        assert!(close(y, WORLD_SIZE / 2.0));
    }

    #[test]
    fn north_is_up_and_poles_are_clamped() {
        let (_, oslo) = project(10.75, 59.91);
        let (_, cape_town) = project(18.42, -33.92);
        assert!(oslo < WORLD_SIZE / 2.0);
        assert!(cape_town > WORLD_SIZE / 2.0);

        let (_, pole) = project(0.0, 90.0);
        assert!(pole.is_finite());
        assert!(close(pole, 0.0));
    }

    #[test]
    fn positions_accept_altitude_and_reject_garbage() {
        let with_altitude = serde_json::json!([8.5, 47.3, 410.0]);
        assert_eq!(project_position(&with_altitude), Some(project(8.5, 47.3)));
        assert_eq!(project_position(&serde_json::json!([8.5])), None);
        assert_eq!(project_position(&serde_json::json!("8.5,47.3")), None);

        let line = serde_json::json!([[0.0, 0.0], "bad", [1.0, 1.0]]);
        assert_eq!(project_line(&line).len(), 2);
    }

    #[test]
    fn bounds_cover_all_points() {
        let bounds = Bounds::from_points([(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)])
            .expect("non-empty");
        assert_eq!(
            bounds,
            Bounds {
                min_x: -2.0,
                min_y: -1.0,
                max_x: 4.0,
                max_y: 5.0
            }
        );
        assert!(Bounds::from_points(Vec::new()).is_none());
        assert!(bounds.intersects(&Bounds::from_point((4.0, 5.0))));
        assert!(!bounds.intersects(&Bounds::from_point((4.1, 5.0))));
    }
}
