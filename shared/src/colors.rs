use crate::track::Track;

/// A CSS named color, handed to the renderer as-is.
pub type ColorName = &'static str;

/// Track colors, cycled by the track's position in the metadata.
pub const TRACK_PALETTE: &[ColorName] = &[
    "Blue",
    "Green",
    "Lime",
    "Yellow",
    "Orange",
    "Pink",
    "Violet",
    "DarkOrange",
    "Gold",
];

/// Line/fill color used when per-track coloring is disabled.
pub const NEUTRAL_COLOR: ColorName = "red";
/// Fill color of crossing points in the default style.
pub const CROSSING_COLOR: ColorName = "red";
/// Single color of everything drawn on a highlight layer.
pub const HIGHLIGHT_COLOR: ColorName = "blue";

/// Palette entry for the `index`-th track. Tracks whose index collides modulo the
/// palette length share a color. `None` only for an empty palette.
pub fn palette_color(palette: &[ColorName], index: usize) -> Option<ColorName> {
    if palette.is_empty() {
        return None;
    }
    Some(palette[index % palette.len()])
}

/// Assign every track its display color from the palette, in metadata order.
pub fn assign_track_colors(tracks: &mut [Track], palette: &[ColorName]) {
    for (index, track) in tracks.iter_mut().enumerate() {
        track.color = palette_color(palette, index);
    }
}
