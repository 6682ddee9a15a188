//! Chart data model and fixed styling
//!
//! Mirrors the `{labels, datasets, options}` shape of a line-chart widget so
//! the browser canvas and the terminal can draw the same thing.

use serde::Serialize;

/// Index of the temperature series in [`ChartModel::datasets`]
pub const TEMPERATURE_SERIES: usize = 0;
/// Index of the humidity series in [`ChartModel::datasets`]
pub const HUMIDITY_SERIES: usize = 1;

/// Line chart with a shared label axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub style: SeriesStyle,
}

/// Line and point styling for a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub border_color: Rgba,
    pub background_color: Rgba,
    pub border_width: f64,
    pub point_radius: f64,
    /// Bezier smoothing, 0.0 draws straight segments
    pub tension: f64,
    pub fill: bool,
}

/// Chart-wide options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub legend: LegendOptions,
    pub tooltip: TooltipOptions,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
    pub font_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipMode {
    /// Show every series at the hovered label
    Index,
    /// Show only the hovered point
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipOptions {
    pub enabled: bool,
    pub mode: TooltipMode,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub title: String,
    pub title_font_size: u32,
    /// Force the axis to include zero
    pub begin_at_zero: bool,
    /// Upper bound on drawn tick labels; `None` draws every label
    pub max_ticks: Option<usize>,
    /// Thin out labels to stay under `max_ticks`
    pub auto_skip: bool,
    pub grid_color: Option<Rgba>,
}

/// An `rgba()` colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS form, e.g. `rgba(255, 99, 132, 0.15)`
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl ChartModel {
    /// The temperature/humidity chart with empty data
    pub fn temperature_humidity() -> Self {
        Self {
            labels: Vec::new(),
            datasets: vec![
                Dataset::new("Temperature (°C)", Rgba::new(255, 99, 132, 1.0)),
                Dataset::new("Humidity (%)", Rgba::new(54, 162, 235, 1.0)),
            ],
            options: ChartOptions::default(),
        }
    }

    /// Replace labels and series data wholesale.
    ///
    /// Lengths are not checked against each other; surfaces draw missing
    /// points as gaps.
    pub fn replace(&mut self, labels: Vec<String>, temperatures: Vec<f64>, humidities: Vec<f64>) {
        self.labels = labels;
        if let Some(ds) = self.datasets.get_mut(TEMPERATURE_SERIES) {
            ds.data = temperatures;
        }
        if let Some(ds) = self.datasets.get_mut(HUMIDITY_SERIES) {
            ds.data = humidities;
        }
    }

    /// Finite (min, max) over every series, if any finite value exists
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in self.datasets.iter().flat_map(|ds| ds.data.iter()) {
            if value.is_finite() {
                min = min.min(*value);
                max = max.max(*value);
            }
        }

        if min > max {
            return None;
        }

        if self.options.y_axis.begin_at_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }

        Some((min, max))
    }

    /// Indices of the labels to draw, honouring `max_ticks` and `auto_skip`
    pub fn tick_indices(&self) -> Vec<usize> {
        let count = self.labels.len();
        let axis = &self.options.x_axis;

        match axis.max_ticks {
            Some(max) if axis.auto_skip && max > 0 && count > max => {
                let step = count.div_ceil(max);
                (0..count).step_by(step).collect()
            }
            _ => (0..count).collect(),
        }
    }
}

impl Dataset {
    pub fn new(label: impl Into<String>, color: Rgba) -> Self {
        Self {
            label: label.into(),
            data: Vec::new(),
            style: SeriesStyle {
                border_color: color,
                background_color: Rgba { a: 0.15, ..color },
                border_width: 3.0,
                point_radius: 5.0,
                tension: 0.3,
                fill: true,
            },
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            legend: LegendOptions {
                display: true,
                font_size: 16,
            },
            tooltip: TooltipOptions {
                enabled: true,
                mode: TooltipMode::Index,
                intersect: false,
            },
            x_axis: AxisOptions {
                title: "Time".to_string(),
                title_font_size: 16,
                begin_at_zero: false,
                max_ticks: Some(10),
                auto_skip: true,
                grid_color: None,
            },
            y_axis: AxisOptions {
                title: "Value".to_string(),
                title_font_size: 16,
                begin_at_zero: false,
                max_ticks: None,
                auto_skip: false,
                grid_color: Some(Rgba::new(0, 0, 0, 0.05)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_humidity_styling() {
        let model = ChartModel::temperature_humidity();
        assert_eq!(model.datasets.len(), 2);

        let temp = &model.datasets[TEMPERATURE_SERIES];
        assert_eq!(temp.label, "Temperature (°C)");
        assert_eq!(temp.style.border_color.css(), "rgba(255, 99, 132, 1)");
        assert_eq!(temp.style.background_color.css(), "rgba(255, 99, 132, 0.15)");

        let hum = &model.datasets[HUMIDITY_SERIES];
        assert_eq!(hum.label, "Humidity (%)");
        assert_eq!(hum.style.border_color.css(), "rgba(54, 162, 235, 1)");

        assert!(!model.options.y_axis.begin_at_zero);
        assert_eq!(model.options.x_axis.max_ticks, Some(10));
        assert!(model.labels.is_empty());
    }

    #[test]
    fn test_replace_overwrites() {
        let mut model = ChartModel::temperature_humidity();
        model.replace(vec!["a".into(), "b".into()], vec![1.0, 2.0], vec![3.0, 4.0]);
        model.replace(vec!["c".into()], vec![5.0], vec![6.0, 7.0]);

        assert_eq!(model.labels, vec!["c"]);
        assert_eq!(model.datasets[TEMPERATURE_SERIES].data, vec![5.0]);
        assert_eq!(model.datasets[HUMIDITY_SERIES].data, vec![6.0, 7.0]);
    }

    #[test]
    fn test_value_range_skips_nan_and_zero_baseline() {
        let mut model = ChartModel::temperature_humidity();
        model.replace(vec![], vec![20.5, f64::NAN], vec![40.0, 41.0]);
        assert_eq!(model.value_range(), Some((20.5, 41.0)));

        model.options.y_axis.begin_at_zero = true;
        assert_eq!(model.value_range(), Some((0.0, 41.0)));

        model.replace(vec![], vec![f64::NAN], vec![]);
        assert_eq!(model.value_range(), None);
    }

    #[test]
    fn test_tick_indices_auto_skip() {
        let mut model = ChartModel::temperature_humidity();
        model.labels = (0..25).map(|i| i.to_string()).collect();
        assert_eq!(model.tick_indices(), vec![0, 3, 6, 9, 12, 15, 18, 21, 24]);

        model.labels.truncate(4);
        assert_eq!(model.tick_indices(), vec![0, 1, 2, 3]);
    }
}
