use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_META_PATH: &str = "data/meta.json";
pub const DEFAULT_FEATURES_PATH: &str = "data/features.geojson";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

pub fn server_port() -> u16 {
    std::env::var("GEONET_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn meta_path() -> PathBuf {
    path_var("GEONET_META_PATH", DEFAULT_META_PATH)
}

pub fn features_path() -> PathBuf {
    path_var("GEONET_FEATURES_PATH", DEFAULT_FEATURES_PATH)
}

pub fn static_dir() -> PathBuf {
    path_var("GEONET_STATIC_DIR", DEFAULT_STATIC_DIR)
}

/// Color lines and points by their first track instead of a single color.
/// Off unless explicitly enabled.
pub fn use_track_colors() -> bool {
    std::env::var("GEONET_TRACK_COLORS")
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

fn path_var(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        temp_env::with_vars_unset(
            [
                "GEONET_PORT",
                "GEONET_META_PATH",
                "GEONET_FEATURES_PATH",
                "GEONET_STATIC_DIR",
                "GEONET_TRACK_COLORS",
            ],
            || {
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(meta_path(), PathBuf::from(DEFAULT_META_PATH));
                assert_eq!(features_path(), PathBuf::from(DEFAULT_FEATURES_PATH));
                assert_eq!(static_dir(), PathBuf::from(DEFAULT_STATIC_DIR));
                assert!(!use_track_colors());
            },
        );
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        temp_env::with_var("GEONET_PORT", Some("not-a-port"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("GEONET_PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("GEONET_PORT", Some("8088"), || {
            assert_eq!(server_port(), 8088);
        });
    }

    #[test]
    fn track_colors_flag_accepts_common_truthy_values() {
        for value in ["1", "true", "YES", " on "] {
            temp_env::with_var("GEONET_TRACK_COLORS", Some(value), || {
                assert!(use_track_colors(), "{value} should enable track colors");
            });
        }
        temp_env::with_var("GEONET_TRACK_COLORS", Some("off"), || {
            assert!(!use_track_colors());
        });
    }

    #[test]
    fn blank_paths_fall_back_to_defaults() {
        temp_env::with_var("GEONET_META_PATH", Some("  "), || {
            assert_eq!(meta_path(), PathBuf::from(DEFAULT_META_PATH));
        });
        temp_env::with_var("GEONET_FEATURES_PATH", Some("/srv/geonet/all.geojson"), || {
            assert_eq!(features_path(), PathBuf::from("/srv/geonet/all.geojson"));
        });
    }
}
