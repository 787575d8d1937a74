use std::collections::BTreeMap;
use std::f64::consts::TAU;

use geonet_shared::{
    ColorName, Feature, FeatureClick, LayerId, MapWidget, MarkerOptions, OverlayOptions, PathStyle,
};
use serde_json::Value;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use crate::projection::{Bounds, project_line, project_position};
use crate::spatial::SpatialGrid;
use crate::viewport::Viewport;

const PATH_COLOR: ColorName = "#3388ff";
const PATH_WEIGHT: f64 = 3.0;
const PATH_OPACITY: f64 = 1.0;
const AREA_FILL_OPACITY: f64 = 0.2;
const BACKGROUND: &str = "#f4f1ea";
const GRATICULE: &str = "rgba(120, 116, 112, 0.18)";
/// Extra screen distance that still counts as a hit.
const HIT_SLOP_PX: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Paint {
    stroke: ColorName,
    fill: Option<ColorName>,
    weight: f64,
    opacity: f64,
    fill_opacity: f64,
}

impl Paint {
    fn marker(options: MarkerOptions) -> Self {
        Self {
            stroke: options.color,
            fill: Some(options.fill_color),
            weight: options.weight,
            opacity: options.opacity,
            fill_opacity: options.fill_opacity,
        }
    }

    fn line(style: &PathStyle) -> Self {
        Self {
            stroke: style.color.unwrap_or(PATH_COLOR),
            fill: None,
            weight: PATH_WEIGHT,
            opacity: PATH_OPACITY,
            fill_opacity: 0.0,
        }
    }

    fn area(style: &PathStyle) -> Self {
        let stroke = style.color.unwrap_or(PATH_COLOR);
        Self {
            stroke,
            fill: Some(style.fill_color.unwrap_or(stroke)),
            weight: PATH_WEIGHT,
            opacity: PATH_OPACITY,
            fill_opacity: AREA_FILL_OPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ShapeGeometry {
    Marker { center: (f64, f64), radius: f64 },
    /// Polylines, or polygon rings when `closed`.
    Path {
        parts: Vec<Vec<(f64, f64)>>,
        closed: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Shape {
    feature: usize,
    geometry: ShapeGeometry,
    paint: Paint,
    bounds: Bounds,
}

impl Shape {
    fn marker(feature: usize, center: (f64, f64), options: MarkerOptions) -> Self {
        Self {
            feature,
            geometry: ShapeGeometry::Marker {
                center,
                radius: options.radius,
            },
            paint: Paint::marker(options),
            bounds: Bounds::from_point(center),
        }
    }

    fn path(
        feature: usize,
        parts: Vec<Vec<(f64, f64)>>,
        closed: bool,
        paint: Paint,
    ) -> Option<Self> {
        let parts: Vec<_> = parts.into_iter().filter(|part| !part.is_empty()).collect();
        let bounds = Bounds::from_points(parts.iter().flatten().copied())?;
        Some(Self {
            feature,
            geometry: ShapeGeometry::Path { parts, closed },
            paint,
            bounds,
        })
    }

    /// How far the drawn shape reaches beyond its world bounds, in screen pixels.
    fn reach_px(&self) -> f64 {
        match self.geometry {
            ShapeGeometry::Marker { radius, .. } => radius + self.paint.weight / 2.0,
            ShapeGeometry::Path { .. } => self.paint.weight / 2.0,
        }
    }

    fn hit(&self, vp: &Viewport, sx: f64, sy: f64) -> bool {
        let tolerance = self.reach_px() + HIT_SLOP_PX;
        match &self.geometry {
            ShapeGeometry::Marker { center, .. } => {
                let (cx, cy) = vp.world_to_screen(center.0, center.1);
                (cx - sx).hypot(cy - sy) <= tolerance
            }
            ShapeGeometry::Path { parts, closed } => {
                let near_outline = parts.iter().any(|part| {
                    let screen: Vec<_> = part
                        .iter()
                        .map(|&(wx, wy)| vp.world_to_screen(wx, wy))
                        .collect();
                    polyline_distance(&screen, *closed, (sx, sy)) <= tolerance
                });
                near_outline || (*closed && contains_even_odd(parts, vp.screen_to_world(sx, sy)))
            }
        }
    }
}

/// Turn one feature into drawables. Unsupported or empty geometries yield nothing.
fn shapes_for(
    index: usize,
    feature: &Feature,
    style: &PathStyle,
    marker: MarkerOptions,
) -> Vec<Shape> {
    let Some(geometry) = feature.geometry.as_ref() else {
        return Vec::new();
    };
    let coords = &geometry.coordinates;
    let marker = marker.with_style(style);
    let children = |value: &Value| value.as_array().cloned().unwrap_or_default();

    match geometry.type_name.as_deref() {
        Some("Point") => project_position(coords)
            .map(|center| vec![Shape::marker(index, center, marker)])
            .unwrap_or_default(),
        Some("MultiPoint") => children(coords)
            .iter()
            .filter_map(project_position)
            .map(|center| Shape::marker(index, center, marker))
            .collect(),
        Some("LineString") => {
            Shape::path(index, vec![project_line(coords)], false, Paint::line(style))
                .into_iter()
                .collect()
        }
        Some("MultiLineString") => {
            let parts = children(coords).iter().map(project_line).collect();
            Shape::path(index, parts, false, Paint::line(style))
                .into_iter()
                .collect()
        }
        Some("Polygon") => {
            let rings = children(coords).iter().map(project_line).collect();
            Shape::path(index, rings, true, Paint::area(style))
                .into_iter()
                .collect()
        }
        Some("MultiPolygon") => children(coords)
            .iter()
            .filter_map(|polygon| {
                let rings = children(polygon).iter().map(project_line).collect();
                Shape::path(index, rings, true, Paint::area(style))
            })
            .collect(),
        _ => Vec::new(),
    }
}

struct Layer {
    shapes: Vec<Shape>,
    interactive: bool,
    grid: SpatialGrid,
    bounds: Option<Bounds>,
    max_reach_px: f64,
}

impl Layer {
    fn new(shapes: Vec<Shape>, interactive: bool) -> Self {
        let shape_bounds: Vec<_> = shapes.iter().map(|shape| shape.bounds).collect();
        let bounds = shape_bounds
            .iter()
            .copied()
            .reduce(|acc, next| acc.union(&next));
        let max_reach_px = shapes.iter().map(Shape::reach_px).fold(0.0, f64::max);
        Self {
            grid: SpatialGrid::build(&shape_bounds),
            shapes,
            interactive,
            bounds,
            max_reach_px,
        }
    }

    /// Topmost shape under the screen point, if any.
    fn hit(&self, vp: &Viewport, sx: f64, sy: f64) -> Option<&Shape> {
        let margin = (self.max_reach_px + HIT_SLOP_PX) / vp.scale;
        let query = Bounds::from_point(vp.screen_to_world(sx, sy)).expanded(margin);
        self.grid
            .candidates(&query)
            .into_iter()
            .rev()
            .map(|idx| &self.shapes[idx])
            .find(|shape| shape.hit(vp, sx, sy))
    }
}

/// Canvas-backed map widget: projected overlay layers drawn bottom to top in the
/// order they were attached.
#[derive(Default)]
pub struct CanvasMap {
    layers: BTreeMap<LayerId, Layer>,
    attached: Vec<LayerId>,
    next_id: u64,
    viewport: Viewport,
    size: (f64, f64),
    pending_fit: Option<Bounds>,
}

impl CanvasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Record the canvas size in CSS pixels. A fit requested before the canvas had a
    /// size is applied now.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = (width, height);
        if let Some(bounds) = self.pending_fit.take() {
            self.fit(bounds);
        }
    }

    pub fn attached_layers(&self) -> &[LayerId] {
        &self.attached
    }

    /// Which feature the user clicked, searching attached interactive layers from the
    /// top down.
    pub fn hit_test(&self, sx: f64, sy: f64) -> Option<FeatureClick> {
        self.attached.iter().rev().find_map(|&id| {
            let layer = self.layers.get(&id).filter(|layer| layer.interactive)?;
            let shape = layer.hit(&self.viewport, sx, sy)?;
            Some(FeatureClick {
                layer: id,
                feature: shape.feature,
            })
        })
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d) {
        let (w, h) = self.size;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);
        self.draw_graticule(ctx);

        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        let visible = self.viewport.visible_bounds(w, h);
        for layer in self.attached.iter().filter_map(|id| self.layers.get(id)) {
            let margin = layer.max_reach_px / self.viewport.scale;
            for shape in &layer.shapes {
                if shape.bounds.expanded(margin).intersects(&visible) {
                    self.draw_shape(ctx, shape);
                }
            }
        }
        ctx.set_global_alpha(1.0);
    }

    /// Meridians and parallels every 10 degrees of projected world space, for orientation.
    fn draw_graticule(&self, ctx: &CanvasRenderingContext2d) {
        let (w, h) = self.size;
        let step_world = crate::projection::WORLD_SIZE / 36.0;
        let step_px = step_world * self.viewport.scale;
        if step_px < 24.0 {
            return;
        }
        let visible = self.viewport.visible_bounds(w, h);
        ctx.set_stroke_style_str(GRATICULE);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        let mut x = (visible.min_x / step_world).floor() * step_world;
        while x <= visible.max_x {
            let (sx, _) = self.viewport.world_to_screen(x, 0.0);
            ctx.move_to(sx, 0.0);
            ctx.line_to(sx, h);
            x += step_world;
        }
        let mut y = (visible.min_y / step_world).floor() * step_world;
        while y <= visible.max_y {
            let (_, sy) = self.viewport.world_to_screen(0.0, y);
            ctx.move_to(0.0, sy);
            ctx.line_to(w, sy);
            y += step_world;
        }
        ctx.stroke();
    }

    fn draw_shape(&self, ctx: &CanvasRenderingContext2d, shape: &Shape) {
        let vp = &self.viewport;
        let paint = shape.paint;
        ctx.begin_path();
        match &shape.geometry {
            ShapeGeometry::Marker { center, radius } => {
                let (sx, sy) = vp.world_to_screen(center.0, center.1);
                ctx.arc(sx, sy, *radius, 0.0, TAU).ok();
            }
            ShapeGeometry::Path { parts, closed } => {
                for part in parts {
                    let mut points = part.iter().map(|&(wx, wy)| vp.world_to_screen(wx, wy));
                    let Some((sx, sy)) = points.next() else {
                        continue;
                    };
                    ctx.move_to(sx, sy);
                    for (sx, sy) in points {
                        ctx.line_to(sx, sy);
                    }
                    if *closed {
                        ctx.close_path();
                    }
                }
            }
        }

        if let Some(fill) = paint.fill {
            ctx.set_global_alpha(paint.fill_opacity);
            ctx.set_fill_style_str(fill);
            ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        }
        if paint.weight > 0.0 {
            ctx.set_global_alpha(paint.opacity);
            ctx.set_stroke_style_str(paint.stroke);
            ctx.set_line_width(paint.weight);
            ctx.stroke();
        }
    }

    fn fit(&mut self, bounds: Bounds) {
        let (w, h) = self.size;
        if !self.viewport.fit_bounds(bounds, w, h) {
            self.pending_fit = Some(bounds);
        }
    }
}

impl MapWidget for CanvasMap {
    fn create_overlay(&mut self, features: &[Feature], options: OverlayOptions<'_>) -> LayerId {
        let shapes = features
            .iter()
            .enumerate()
            .filter(|(_, feature)| options.filter.is_none_or(|keep| keep(feature)))
            .flat_map(|(index, feature)| {
                let style = (options.style)(feature);
                shapes_for(index, feature, &style, options.marker)
            })
            .collect();

        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, Layer::new(shapes, options.interactive));
        id
    }

    fn add_layer(&mut self, layer: LayerId) {
        if self.layers.contains_key(&layer) && !self.attached.contains(&layer) {
            self.attached.push(layer);
        }
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.attached.retain(|id| *id != layer);
        self.layers.remove(&layer);
    }

    fn fit_to_layer(&mut self, layer: LayerId) {
        if let Some(bounds) = self.layers.get(&layer).and_then(|layer| layer.bounds) {
            self.fit(bounds);
        }
    }
}

/// Distance from `p` to the nearest segment of a polyline, all in screen pixels.
fn polyline_distance(points: &[(f64, f64)], closed: bool, p: (f64, f64)) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (only.0 - p.0).hypot(only.1 - p.1),
        _ => {
            let closing = closed.then(|| (points[points.len() - 1], points[0]));
            points
                .windows(2)
                .map(|pair| (pair[0], pair[1]))
                .chain(closing)
                .map(|(a, b)| segment_distance(a, b, p))
                .fold(f64::INFINITY, f64::min)
        }
    }
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (nx, ny) = (a.0 + t * dx, a.1 + t * dy);
    (p.0 - nx).hypot(p.1 - ny)
}

/// Even-odd point-in-polygon over all rings, so holes are excluded.
fn contains_even_odd(rings: &[Vec<(f64, f64)>], p: (f64, f64)) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}
