//! Delivery heatmap domain models.

use serde::Serialize;

/// One aggregated heatmap cell: delivery volume for a region/woreda pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub region: String,
    /// Ethiopian third-level administrative sub-division.
    pub woreda: String,
    pub delivery_count: i64,
    pub center_lat: f64,
    pub center_long: f64,
    /// Normalized intensity in [0, 1].
    pub intensity: f64,
    /// Interpolated blue-to-red hex color for map rendering.
    pub color: String,
}

/// Summary wrapper for the heatmap view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapSummary {
    pub total_deliveries: i64,
    pub total_regions: usize,
    pub total_woredas: usize,
    pub heatmap_data: Vec<HeatmapCell>,
}

/// Intensity for a delivery count, normalized against a reference volume of
/// 100 deliveries and capped at 1.0.
pub fn intensity_for_count(delivery_count: i64) -> f64 {
    (delivery_count as f64 / 100.0).min(1.0)
}

/// Interpolates a hex color from blue (intensity 0) to red (intensity 1).
pub fn heatmap_color(intensity: f64) -> String {
    let clamped = intensity.clamp(0.0, 1.0);
    let red = (clamped * 255.0) as u8;
    let blue = ((1.0 - clamped) * 255.0) as u8;
    format!("#{red:02x}00{blue:02x}")
}
