#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renders heat layers as a single self-contained HTML page.
//!
//! The page embeds a Leaflet map with one `leaflet.heat` overlay per
//! [`HeatLayer`], in layer order, plus a slider control that reveals
//! exactly one overlay at a time. Overlay 0 is shown once the page loads.

pub mod control;
pub mod html;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use violation_heatmap_violation_models::{HeatLayer, MapView};

use crate::html::{escape_html, script_json};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str = "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js";

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "violations_heatmap_week_hour_slider.html";

/// Default output file name for the single all-records page.
pub const OVERVIEW_OUTPUT: &str = "violations_heatmap.html";

/// Errors that can occur while rendering or writing the heatmap page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// There were no layers to render.
    #[error("Nothing to render: no heat layers")]
    NoLayers,

    /// Serializing layer data failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `leaflet.heat` options applied to every layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapStyle {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur radius in pixels.
    pub blur: u32,
    /// Minimum overlay opacity.
    pub min_opacity: f64,
    /// Colour stops keyed by intensity (`"0.2"` .. `"1.0"`).
    pub gradient: BTreeMap<String, String>,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        let gradient = [
            ("0.2", "blue"),
            ("0.4", "cyan"),
            ("0.6", "lime"),
            ("0.8", "orange"),
            ("1.0", "red"),
        ]
        .into_iter()
        .map(|(stop, colour)| (stop.to_owned(), colour.to_owned()))
        .collect();

        Self {
            radius: 25,
            blur: 15,
            min_opacity: 0.3,
            gradient,
        }
    }
}

impl HeatmapStyle {
    /// Tighter points for the single layer that draws every record at once.
    #[must_use]
    pub fn overview() -> Self {
        Self {
            radius: 8,
            min_opacity: 0.5,
            ..Self::default()
        }
    }
}

/// Leaflet heatmap page renderer.
#[derive(Debug, Clone)]
pub struct LeafletHeatmap {
    /// Page title.
    pub title: String,
    /// Initial viewport.
    pub view: MapView,
    /// Layer styling.
    pub style: HeatmapStyle,
}

impl LeafletHeatmap {
    #[must_use]
    pub fn new(title: &str, view: MapView) -> Self {
        Self {
            title: title.to_owned(),
            view,
            style: HeatmapStyle::default(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: HeatmapStyle) -> Self {
        self.style = style;
        self
    }

    /// Renders `layers` into a complete HTML document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoLayers`] if `layers` is empty, or
    /// [`RenderError::Json`] if layer data cannot be serialized.
    pub fn render(&self, layers: &[HeatLayer]) -> Result<String, RenderError> {
        let Some(first) = layers.first() else {
            return Err(RenderError::NoLayers);
        };

        let labels: Vec<&str> = layers.iter().map(|l| l.label.as_str()).collect();
        let points: Vec<Vec<[f64; 3]>> = layers
            .iter()
            .map(|l| l.points.iter().map(|p| p.as_triple()).collect())
            .collect();
        let center = [self.view.center.latitude, self.view.center.longitude];

        let title = escape_html(&self.title);
        let mut page = String::new();

        page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        page.push_str("<meta charset=\"utf-8\">\n");
        page.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        let _ = writeln!(page, "<title>{title}</title>");
        let _ = writeln!(page, "<link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">");
        let _ = writeln!(page, "<script src=\"{LEAFLET_JS}\"></script>");
        let _ = writeln!(page, "<script src=\"{LEAFLET_HEAT_JS}\"></script>");
        page.push_str("<style>\nhtml, body, #map { height: 100%; margin: 0; }\n");
        page.push_str(control::style());
        page.push_str("</style>\n</head>\n<body>\n");
        page.push_str("<div id=\"map\"></div>\n");
        page.push_str(&control::markup(layers.len(), &first.label));

        page.push_str("<script>\n");
        let _ = writeln!(page, "var periodLabels = {};", script_json(&labels)?);
        let _ = writeln!(page, "var heatLayerData = {};", script_json(&points)?);
        let _ = writeln!(page, "var heatStyle = {};", script_json(&self.style)?);
        let _ = writeln!(
            page,
            "var map = L.map('map').setView({}, {});",
            script_json(&center)?,
            self.view.zoom
        );
        let _ = writeln!(
            page,
            "L.tileLayer({}, {{ maxZoom: 19, attribution: {} }}).addTo(map);",
            script_json(TILE_URL)?,
            script_json(TILE_ATTRIBUTION)?
        );
        page.push_str(
            "var heatLayers = heatLayerData.map(function (points) {\n    return L.heatLayer(points, heatStyle);\n});\n",
        );
        page.push_str(control::script());
        page.push_str("</script>\n</body>\n</html>\n");

        log::debug!(
            "Rendered {} layers ({} points, {} bytes)",
            layers.len(),
            points.iter().map(Vec::len).sum::<usize>(),
            page.len()
        );

        Ok(page)
    }
}

/// Writes the rendered page to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the directory or file cannot be written.
pub fn write_artifact(path: &Path, html: &str) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    log::info!("File saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use violation_heatmap_violation_models::{BucketKey, GeoPoint, HeatPoint};

    use super::*;

    fn layers(count: usize) -> Vec<HeatLayer> {
        BucketKey::all()
            .take(count)
            .map(|key| HeatLayer {
                key: Some(key),
                count: 0,
                points: vec![HeatPoint::new(GeoPoint::NEW_YORK_CITY, 0.1)],
                label: HeatLayer::label_for(key, 0),
            })
            .collect()
    }

    /// Pulls the JSON assigned to `var {name} = ...;` back out of the page.
    fn script_var(page: &str, name: &str) -> serde_json::Value {
        let prefix = format!("var {name} = ");
        let line = page
            .lines()
            .find(|l| l.starts_with(&prefix))
            .unwrap_or_else(|| panic!("no {name} in page"));
        let json = line.trim_start_matches(&prefix).trim_end_matches(';');
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn renders_one_overlay_per_layer_in_order() {
        let page = LeafletHeatmap::new("Test", MapView::default())
            .render(&layers(35))
            .unwrap();

        let data = script_var(&page, "heatLayerData");
        assert_eq!(data.as_array().unwrap().len(), 35);
        assert_eq!(data[0][0], serde_json::json!([40.7128, -74.006, 0.1]));

        let labels = script_var(&page, "periodLabels");
        assert_eq!(labels.as_array().unwrap().len(), 35);
        assert_eq!(labels[0], "Monday Early Morning (4-8h) (0 violations)");
        assert_eq!(labels[34], "Sunday Night (20-24h) (0 violations)");

        assert!(page.contains("max=\"34\""));
        assert!(page.contains("setView([40.7128,-74.006], 11)"));
    }

    #[test]
    fn embeds_default_style() {
        let page = LeafletHeatmap::new("Test", MapView::default())
            .render(&layers(1))
            .unwrap();
        let style = script_var(&page, "heatStyle");

        assert_eq!(style["radius"], 25);
        assert_eq!(style["blur"], 15);
        assert_eq!(style["minOpacity"], 0.3);
        assert_eq!(style["gradient"]["0.8"], "orange");
    }

    #[test]
    fn overview_style_overrides_radius() {
        let layer = HeatLayer {
            key: None,
            count: 2,
            points: vec![
                HeatPoint::new(GeoPoint::new(40.75, -73.98), 1.0),
                HeatPoint::new(GeoPoint::new(40.76, -73.97), 1.0),
            ],
            label: HeatLayer::overview_label(2),
        };
        let page = LeafletHeatmap::new("Overview", MapView::default())
            .with_style(HeatmapStyle::overview())
            .render(&[layer])
            .unwrap();

        let style = script_var(&page, "heatStyle");
        assert_eq!(style["radius"], 8);
        assert_eq!(style["blur"], 15);
        assert_eq!(style["minOpacity"], 0.5);

        assert_eq!(script_var(&page, "heatLayerData")[0].as_array().unwrap().len(), 2);
        assert_eq!(script_var(&page, "periodLabels")[0], "All violations (2 violations)");
        assert!(page.contains("max=\"0\""));
    }

    #[test]
    fn escapes_title_and_labels() {
        let mut layers = layers(1);
        layers[0].label = "</script><b>".to_string();
        let page = LeafletHeatmap::new("A & B", MapView::default())
            .render(&layers)
            .unwrap();

        assert!(page.contains("<title>A &amp; B</title>"));
        assert!(!page.contains("</script><b>"));
        assert_eq!(script_var(&page, "periodLabels")[0], "</script><b>");
    }

    #[test]
    fn rejects_empty_layer_list() {
        let err = LeafletHeatmap::new("Test", MapView::default())
            .render(&[])
            .unwrap_err();
        assert!(matches!(err, RenderError::NoLayers));
    }

    #[test]
    fn writes_artifact_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/heatmap.html");
        write_artifact(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
