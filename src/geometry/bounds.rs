use serde::{Deserialize, Serialize};

use super::TrackPoint;

/// Bounding box for coordinate calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Bounding box of a polyline, `None` when there are no points
    pub fn from_points(points: &[TrackPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bbox = Self::new();
        for point in points {
            bbox.update(point);
        }
        Some(bbox)
    }

    pub fn update(&mut self, point: &TrackPoint) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> TrackPoint {
        TrackPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform scale and offset placing a track in the middle of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    /// Fit `bbox` inside a `width` x `height` canvas keeping `padding` pixels free
    /// on every side. The aspect ratio is preserved and the track is centred on
    /// the axis with spare room.
    pub fn fit(bbox: &BoundingBox, width: f64, height: f64, padding: f64) -> Self {
        let usable_width = width - padding * 2.0;
        let usable_height = height - padding * 2.0;

        let scale_x = usable_width / bbox.width();
        let scale_y = usable_height / bbox.height();
        let mut scale = scale_x.min(scale_y);
        // a single point (or an empty box) has no extent to scale
        if !scale.is_finite() || scale <= 0.0 {
            scale = 1.0;
        }

        // the box centre lands on the canvas centre
        let center = bbox.center();
        let offset_x = width / 2.0 - center.x * scale;
        let offset_y = height / 2.0 - center.y * scale;

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    pub fn apply(&self, point: &TrackPoint) -> TrackPoint {
        TrackPoint::new(
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }
}
