// SVG track map generator for circuits classified into speed zones

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::TrackVizError;
use crate::geometry::{BoundingBox, FitTransform, TrackPoint};
use crate::track_analysis::curvature::DEFAULT_LABEL_MIN_LEN;
use crate::track_analysis::{Corner, Segment, speed_zone_labels, speed_zone_runs};

/// Configuration for SVG track map generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackMapConfig {
    /// Canvas dimensions (width, height) in pixels
    pub canvas_size: (u32, u32),
    /// Free space kept around the track on every side, in pixels
    pub padding: f64,
    /// Stroke width for the track line
    pub stroke_width: f64,
    /// Stroke width of the translucent halo drawn under the track
    pub glow_width: f64,
    pub background: String,
    pub corner_radius: f64,
    /// Zone runs need more points than this to be labelled
    pub label_min_len: usize,
    /// Vertical distance between a label and the track, in pixels
    pub label_offset: f64,
}

impl Default for TrackMapConfig {
    fn default() -> Self {
        Self {
            canvas_size: (800, 600),
            padding: 50.0,
            stroke_width: 24.0,
            glow_width: 32.0,
            background: "#0a0e14".to_string(),
            corner_radius: 16.0,
            label_min_len: DEFAULT_LABEL_MIN_LEN,
            label_offset: 40.0,
        }
    }
}

/// Generator for SVG maps of a track's speed zones and corners
pub struct TrackMapGenerator {
    config: TrackMapConfig,
}

impl TrackMapGenerator {
    pub fn new() -> Self {
        Self {
            config: TrackMapConfig::default(),
        }
    }

    pub fn with_config(config: TrackMapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackMapConfig {
        &self.config
    }

    /// Placement of `coords` on the configured canvas
    pub fn fit_transform(&self, coords: &[TrackPoint]) -> Option<FitTransform> {
        let bbox = BoundingBox::from_points(coords)?;
        let (width, height) = self.config.canvas_size;
        Some(FitTransform::fit(
            &bbox,
            width as f64,
            height as f64,
            self.config.padding,
        ))
    }

    /// Render a closed track as an SVG document.
    ///
    /// `segments` must hold one entry per coordinate, as produced by the
    /// curvature analyzer. Corners are drawn at their apex.
    pub fn render(
        &self,
        coords: &[TrackPoint],
        segments: &[Segment],
        corners: &[Corner],
    ) -> Result<String, TrackVizError> {
        self.validate(coords, segments)?;
        let fit = self
            .fit_transform(coords)
            .ok_or_else(|| TrackVizError::TrackMapError {
                reason: "Cannot fit an empty track onto the canvas".to_string(),
            })?;

        debug!(
            "Rendering track map from {} points, {} corners, scale {:.3}",
            coords.len(),
            corners.len(),
            fit.scale
        );

        let points: Vec<TrackPoint> = coords.iter().map(|p| fit.apply(p)).collect();
        let (width, height) = self.config.canvas_size;
        let mut svg = String::with_capacity(1024 + points.len() * 24);

        svg.push_str(&format!(
            r#"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}">
  <defs>
    <style>
      .zone {{ fill: none; stroke-linecap: round; stroke-linejoin: round; }}
      .glow {{ stroke-opacity: 0.3; }}
      .corner-marker {{ fill: rgba(20, 20, 20, 0.85); stroke: rgba(255, 255, 255, 0.6); stroke-width: 1.5; }}
      .corner-number {{ fill: #FFFFFF; font: bold 14px Arial; }}
      .zone-label {{ font: bold 11px Arial; }}
      .start-finish {{ stroke: #fff; stroke-width: 4; stroke-dasharray: 10 10; }}
    </style>
  </defs>
  <rect width="{w}" height="{h}" fill="{bg}" />"#,
            w = width,
            h = height,
            bg = self.config.background
        ));

        self.write_zones(&mut svg, &points, segments);
        self.write_corners(&mut svg, &fit, corners);
        self.write_labels(&mut svg, &points, segments);

        let start = points[0];
        svg.push_str(&format!(
            "\n  <line class=\"start-finish\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" />",
            start.x - 15.0,
            start.y,
            start.x + 15.0,
            start.y
        ));

        svg.push_str("\n</svg>");
        Ok(svg)
    }

    fn validate(&self, coords: &[TrackPoint], segments: &[Segment]) -> Result<(), TrackVizError> {
        if coords.len() < 2 {
            return Err(TrackVizError::TrackMapError {
                reason: format!(
                    "Insufficient track points: {} (minimum 2)",
                    coords.len()
                ),
            });
        }
        if segments.len() != coords.len() {
            return Err(TrackVizError::TrackMapError {
                reason: format!(
                    "Segment count {} does not match {} track points",
                    segments.len(),
                    coords.len()
                ),
            });
        }
        if let Some(i) = coords.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(TrackVizError::TrackMapError {
                reason: format!("Track point {} has non-finite coordinates", i),
            });
        }
        Ok(())
    }

    /// One glow and one solid polyline per zone run. Each run reaches one
    /// point into the next so the loop is drawn without gaps.
    fn write_zones(&self, svg: &mut String, points: &[TrackPoint], segments: &[Segment]) {
        let n = points.len();
        for run in speed_zone_runs(segments) {
            let path = (run.start..=run.end())
                .map(|i| {
                    let p = points[i % n];
                    format!("{:.2},{:.2}", p.x, p.y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let color = run.zone.color();

            svg.push_str(&format!(
                "\n  <polyline class=\"zone glow\" stroke=\"{}\" stroke-width=\"{:.1}\" points=\"{}\" />",
                color, self.config.glow_width, path
            ));
            svg.push_str(&format!(
                "\n  <polyline class=\"zone\" stroke=\"{}\" stroke-width=\"{:.1}\" points=\"{}\" />",
                color, self.config.stroke_width, path
            ));
        }
    }

    fn write_corners(&self, svg: &mut String, fit: &FitTransform, corners: &[Corner]) {
        for corner in corners {
            let p = fit.apply(&corner.position);
            svg.push_str(&format!(
                "\n  <circle class=\"corner-marker\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.1}\" />",
                p.x, p.y, self.config.corner_radius
            ));
            svg.push_str(&format!(
                "\n  <text class=\"corner-number\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
                p.x, p.y, corner.number
            ));
        }
    }

    fn write_labels(&self, svg: &mut String, points: &[TrackPoint], segments: &[Segment]) {
        for (zone, index) in speed_zone_labels(segments, self.config.label_min_len) {
            let p = points[index];
            svg.push_str(&format!(
                "\n  <text class=\"zone-label\" x=\"{:.2}\" y=\"{:.2}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
                p.x,
                p.y - self.config.label_offset,
                zone.color(),
                zone.label()
            ));
        }
    }
}

impl Default for TrackMapGenerator {
    fn default() -> Self {
        Self::new()
    }
}
