//! The time-period slider overlaid on the map.
//!
//! A range input indexes the heat layers; moving it removes the visible
//! layer and adds the selected one, so exactly one overlay is ever shown.

use std::fmt::Write as _;

use crate::html::escape_html;

/// Element id of the range input.
pub const SLIDER_ID: &str = "periodSlider";

/// Element id of the label under the slider.
pub const LABEL_ID: &str = "periodLabel";

const CONTROL_STYLE: &str = r"
.period-control {
    position: fixed;
    bottom: 15px;
    right: 15px;
    z-index: 1000;
    background: rgba(255, 255, 255, 0.95);
    padding: 12px 16px;
    border-radius: 8px;
    box-shadow: 0 3px 12px rgba(0, 0, 0, 0.3);
    font-family: Arial, sans-serif;
    font-size: 12px;
    min-width: 280px;
}
.period-control .title {
    margin-bottom: 6px;
    font-weight: bold;
    color: #333;
    font-size: 11px;
}
.period-control input {
    width: 240px;
    margin: 4px 0;
    cursor: pointer;
}
.period-control .label {
    font-size: 10px;
    color: #555;
    margin-top: 4px;
    line-height: 1.2;
}
";

/// Shows layer `index`, hiding the previous one, and updates the label.
/// Expects `map`, `heatLayers` and `periodLabels` in scope.
const CONTROL_SCRIPT: &str = r"
var visibleLayer = null;

function showPeriod(index) {
    if (visibleLayer !== null) {
        map.removeLayer(visibleLayer);
        visibleLayer = null;
    }
    if (index >= 0 && index < heatLayers.length) {
        visibleLayer = heatLayers[index].addTo(map);
        document.getElementById('periodLabel').textContent = periodLabels[index];
    }
}

document.getElementById('periodSlider').addEventListener('input', function () {
    showPeriod(parseInt(this.value, 10));
});

window.addEventListener('load', function () {
    showPeriod(parseInt(document.getElementById('periodSlider').value, 10));
});
";

#[must_use]
pub const fn style() -> &'static str {
    CONTROL_STYLE
}

#[must_use]
pub const fn script() -> &'static str {
    CONTROL_SCRIPT
}

/// Markup for the control. `first_label` is shown until the script runs.
#[must_use]
pub fn markup(layer_count: usize, first_label: &str) -> String {
    let max_index = layer_count.saturating_sub(1);
    let mut html = String::new();

    html.push_str("<div class=\"period-control\">\n");
    html.push_str("    <div class=\"title\">Time Period Control</div>\n");
    let _ = writeln!(
        html,
        "    <input type=\"range\" id=\"{SLIDER_ID}\" min=\"0\" max=\"{max_index}\" value=\"0\" step=\"1\">"
    );
    let _ = writeln!(
        html,
        "    <div class=\"label\" id=\"{LABEL_ID}\">{}</div>",
        escape_html(first_label)
    );
    html.push_str("</div>\n");

    html
}
